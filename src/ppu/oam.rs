#![doc = r#"
Sprite memory (OAM)

Layout
- 256 bytes = 64 entries of 4 bytes: `y`, `pattern_index`, `attributes`, `x`.
- Attribute byte: bits 1..0 palette group, bit 5 priority, bit 6 flip horizontal,
  bit 7 flip vertical.

Sharing
- The PPU reads it during the sprite pass; the DMA port at $4014 fills it from
  the system bus. Both hold the same `Rc<RefCell<SpriteMemory>>`.
- Exposed through `Memory` so it can also be mapped on a dispatcher; addresses
  wrap within the 256-byte window.
"#]

use bitflags::bitflags;

use crate::error::BusResult;
use crate::memory::Memory;

pub const OAM_SIZE: usize = 256;
pub const SPRITE_COUNT: usize = 64;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SpriteAttributes: u8 {
        const PALETTE_LO  = 0b0000_0001;
        const PALETTE_HI  = 0b0000_0010;
        const BEHIND_BG   = 0b0010_0000;
        const FLIP_H      = 0b0100_0000;
        const FLIP_V      = 0b1000_0000;
    }
}

/// Decoded view of one OAM entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sprite {
    pub y: u8,
    pub pattern_index: u8,
    pub attributes: SpriteAttributes,
    pub x: u8,
}

impl Sprite {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            y: bytes[0],
            pattern_index: bytes[1],
            attributes: SpriteAttributes::from_bits_retain(bytes[2]),
            x: bytes[3],
        }
    }

    #[inline]
    pub fn palette_group(&self) -> u8 {
        self.attributes.bits() & 0x03
    }

    #[inline]
    pub fn flip_h(&self) -> bool {
        self.attributes.contains(SpriteAttributes::FLIP_H)
    }

    #[inline]
    pub fn flip_v(&self) -> bool {
        self.attributes.contains(SpriteAttributes::FLIP_V)
    }

    #[inline]
    pub fn behind_background(&self) -> bool {
        self.attributes.contains(SpriteAttributes::BEHIND_BG)
    }

    /// Whether scanline `row` falls inside this 8-pixel-tall sprite.
    #[inline]
    pub fn covers_row(&self, row: usize) -> bool {
        let top = self.y as usize;
        (top..top + 8).contains(&row)
    }
}

pub struct SpriteMemory {
    data: [u8; OAM_SIZE],
}

impl Default for SpriteMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteMemory {
    pub fn new() -> Self {
        Self {
            data: [0; OAM_SIZE],
        }
    }

    /// Decode entry `index` (0..64).
    pub fn sprite(&self, index: usize) -> Sprite {
        let b = index * 4;
        Sprite::from_bytes([
            self.data[b],
            self.data[b + 1],
            self.data[b + 2],
            self.data[b + 3],
        ])
    }

    /// Replace the whole table with one 256-byte page. Missing bytes read as 0.
    pub fn load_page(&mut self, page: &[u8]) {
        for (i, slot) in self.data.iter_mut().enumerate() {
            *slot = page.get(i).copied().unwrap_or(0);
        }
    }

    #[inline]
    pub fn peek(&self, index: usize) -> u8 {
        self.data[index & 0xFF]
    }

    #[inline]
    pub fn poke(&mut self, index: usize, value: u8) {
        self.data[index & 0xFF] = value;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Memory for SpriteMemory {
    fn read(&mut self, address: u16) -> BusResult<u8> {
        Ok(self.peek(address as usize))
    }

    fn write(&mut self, address: u16, data: u8) -> BusResult<()> {
        self.poke(address as usize, data);
        Ok(())
    }
}
