/*!
Palette memory: 32 bytes at $3F00 on the video bus.

Entries $10/$14/$18/$1C are not separate storage; they alias $00/$04/$08/$0C.
Both reads and writes are normalised through that table before touching the
backing store. Only the low 6 bits of an entry select a colour; masking happens
at lookup time in the renderer.
*/

use crate::error::BusResult;
use crate::memory::{Memory, Ram};

pub const PALETTE_SIZE: usize = 0x20;

pub struct PaletteMemory {
    ram: Ram,
}

impl Default for PaletteMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteMemory {
    pub fn new() -> Self {
        Self {
            ram: Ram::new(PALETTE_SIZE),
        }
    }

    /// Map an offset inside the palette window to its storage slot.
    #[inline]
    pub fn translate(address: u16) -> u16 {
        match address {
            0x10 => 0x00,
            0x14 => 0x04,
            0x18 => 0x08,
            0x1C => 0x0C,
            a => a,
        }
    }
}

impl Memory for PaletteMemory {
    fn read(&mut self, address: u16) -> BusResult<u8> {
        assert!((address as usize) < PALETTE_SIZE);
        self.ram.read(Self::translate(address))
    }

    fn write(&mut self, address: u16, data: u8) -> BusResult<()> {
        assert!((address as usize) < PALETTE_SIZE);
        self.ram.write(Self::translate(address), data)
    }
}
