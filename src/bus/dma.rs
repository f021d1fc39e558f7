/*!
Sprite DMA port ($4014).

Purpose
- Writing page `p` to the port requests a copy of `$pp00..=$ppFF` from the
  system bus into sprite memory.
- The port only latches the request. The copy runs after the CPU tick that wrote
  it (see `clock::step`), so no device is mid-access while the source page is
  read; reads keep their side effects exactly as CPU reads would.
- Reading the port is a protocol violation.
- The source page goes through the normal system-bus policy. A page inside the
  PPU register window ($20-$3F) reads the write-only control port first and
  fails with `NesError::Protocol`, which the console treats as fatal.

Not modeled: the 513/514-cycle CPU stall.
*/

use std::cell::RefCell;

use log::debug;

use super::SystemBus;
use crate::error::{BusResult, NesError};
use crate::memory::Memory;
use crate::ppu::SpriteMemory;
use crate::ppu::oam::OAM_SIZE;

#[derive(Debug, Default)]
pub struct DmaPort {
    pending: Option<u8>,
    transfers: u64,
}

impl DmaPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page requested by the last write, if not yet performed.
    pub fn pending(&self) -> Option<u8> {
        self.pending
    }

    pub fn take_pending(&mut self) -> Option<u8> {
        self.pending.take()
    }

    /// Completed transfers since construction.
    pub fn transfers(&self) -> u64 {
        self.transfers
    }
}

impl Memory for DmaPort {
    fn read(&mut self, _address: u16) -> BusResult<u8> {
        Err(NesError::Protocol("DMA port is write-only".into()))
    }

    fn write(&mut self, _address: u16, data: u8) -> BusResult<()> {
        self.pending = Some(data);
        Ok(())
    }
}

/// Copy page `page` of the system bus into `oam`.
pub fn transfer(
    bus: &SystemBus,
    dma: &RefCell<DmaPort>,
    page: u8,
    oam: &RefCell<SpriteMemory>,
) -> BusResult<()> {
    let base = (page as u16) << 8;
    debug!("dma: copying ${:04X}-${:04X} into sprite memory", base, base | 0xFF);

    let mut buffer = [0u8; OAM_SIZE];
    for (i, slot) in buffer.iter_mut().enumerate() {
        *slot = bus.read(base + i as u16)?;
    }
    oam.borrow_mut().load_page(&buffer);
    dma.borrow_mut().transfers += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SystemDevices;
    use crate::memory::Rom;
    use crate::ppu::Ppu;

    fn devices() -> SystemDevices {
        SystemDevices::new(Ppu::new(&[0u8; 0x2000]), Rom::new(vec![0; 0x8000]))
    }

    #[test]
    fn write_latches_page() {
        let mut port = DmaPort::new();
        port.write(0, 0x02).unwrap();
        assert_eq!(port.pending(), Some(0x02));
        assert_eq!(port.take_pending(), Some(0x02));
        assert_eq!(port.pending(), None);
    }

    #[test]
    fn read_is_protocol_error() {
        let mut port = DmaPort::new();
        assert!(matches!(port.read(0), Err(NesError::Protocol(_))));
    }

    #[test]
    fn copies_a_page_from_work_ram() {
        let dev = devices();
        let bus = dev.map(crate::bus::default_benign_ranges());
        for i in 0..256u16 {
            bus.write(0x0200 + i, i as u8 ^ 0x5A).unwrap();
        }

        let oam = dev.ppu.borrow().oam();
        transfer(&bus, &dev.dma, 0x02, &oam).unwrap();

        let oam = oam.borrow();
        for i in 0..256usize {
            assert_eq!(oam.peek(i), i as u8 ^ 0x5A);
        }
        assert_eq!(dev.dma.borrow().transfers(), 1);
    }

    #[test]
    fn copy_through_ram_mirror() {
        let dev = devices();
        let bus = dev.map(crate::bus::default_benign_ranges());
        bus.write(0x0300, 0x77).unwrap();

        let oam = dev.ppu.borrow().oam();
        // $0B00 mirrors $0300
        transfer(&bus, &dev.dma, 0x0B, &oam).unwrap();
        assert_eq!(oam.borrow().peek(0), 0x77);
    }

    #[test]
    fn register_window_page_fails_on_write_only_port() {
        let dev = devices();
        let bus = dev.map(crate::bus::default_benign_ranges());
        let oam = dev.ppu.borrow().oam();
        let err = transfer(&bus, &dev.dma, 0x20, &oam).unwrap_err();
        assert_eq!(err, NesError::Protocol("invalid register read: 0".into()));
        assert_eq!(dev.dma.borrow().transfers(), 0);
        assert_eq!(oam.borrow().peek(0), 0);
    }

    #[test]
    fn unmapped_source_page_fails() {
        let dev = devices();
        let bus = dev.map(crate::bus::default_benign_ranges());
        let oam = dev.ppu.borrow().oam();
        let err = transfer(&bus, &dev.dma, 0x50, &oam).unwrap_err();
        assert_eq!(err.unmapped_address(), Some(0x5000));
        assert_eq!(dev.dma.borrow().transfers(), 0);
    }
}
