/*!
Mirror adapter: maps a large address window onto a smaller region.

The relative address is reduced modulo `period` before it reaches the target,
so a 2 KiB RAM registered through `Mirror::new(ram, 0x800)` over $0000-$1FFF
answers at $0000, $0800, $1000 and $1800, and the 8-byte PPU register file
registered over $2000-$3FFF repeats every 8 bytes.
*/

use super::{Memory, SharedMemory};
use crate::error::BusResult;

pub struct Mirror {
    target: SharedMemory,
    period: u16,
}

impl Mirror {
    /// `period` must be nonzero.
    pub fn new(target: SharedMemory, period: u16) -> Self {
        assert!(period > 0, "mirror period must be nonzero");
        Self { target, period }
    }

    #[inline]
    fn fold(&self, address: u16) -> u16 {
        address % self.period
    }
}

impl Memory for Mirror {
    fn read(&mut self, address: u16) -> BusResult<u8> {
        let a = self.fold(address);
        self.target.borrow_mut().read(a)
    }

    fn write(&mut self, address: u16, data: u8) -> BusResult<()> {
        let a = self.fold(address);
        self.target.borrow_mut().write(a, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Ram, shared};

    #[test]
    fn mirrored_reads_and_writes() {
        let ram = shared(Ram::new(0x800));
        let mut m = Mirror::new(ram.clone(), 0x800);

        m.write(0x0001, 0xAA).unwrap();
        assert_eq!(m.read(0x0001).unwrap(), 0xAA);
        assert_eq!(m.read(0x0801).unwrap(), 0xAA);
        assert_eq!(m.read(0x1801).unwrap(), 0xAA);

        // Overwrite via a mirror address and verify the backing store sees it.
        m.write(0x1801, 0x55).unwrap();
        assert_eq!(ram.borrow().get(0x0001), 0x55);
    }
}
