/*!
Clock: order of operations for one CPU tick.

1. Tick the CPU against the system bus.
2. Run a DMA transfer if the CPU requested one during that tick.
3. Tick the PPU three times.
4. If the PPU raised NMI during those ticks, deliver it to the CPU.

The PPU's NMI callback only sets the `nmi` latch passed in here; delivery to the
CPU happens in step 4, after the PPU borrow has ended.
*/

use std::cell::{Cell, RefCell};

use super::{DmaPort, SystemBus, dma};
use crate::error::BusResult;
use crate::ppu::Ppu;

pub const PPU_TICKS_PER_CPU_TICK: u32 = 3;

/// The processor driving the system bus.
pub trait CpuCore {
    /// Execute one CPU tick, accessing memory through `bus`.
    fn tick(&mut self, bus: &SystemBus) -> BusResult<()>;
    /// Deliver a non-maskable interrupt.
    fn nmi(&mut self);
    /// Current program counter, for diagnostics.
    fn program_counter(&self) -> u16;
}

/// Advance the machine by one CPU tick.
pub fn step<C: CpuCore + ?Sized>(
    cpu: &mut C,
    bus: &SystemBus,
    ppu: &RefCell<Ppu>,
    dma: &RefCell<DmaPort>,
    nmi: &Cell<bool>,
) -> BusResult<()> {
    cpu.tick(bus)?;

    // Released before the copy: the source page may include the port itself.
    let pending = dma.borrow_mut().take_pending();
    if let Some(page) = pending {
        let oam = ppu.borrow().oam();
        dma::transfer(bus, dma, page, &oam)?;
    }

    {
        let mut ppu = ppu.borrow_mut();
        for _ in 0..PPU_TICKS_PER_CPU_TICK {
            ppu.tick()?;
        }
    }

    if nmi.replace(false) {
        cpu.nmi();
    }
    Ok(())
}
