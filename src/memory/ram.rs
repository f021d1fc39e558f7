/*!
RAM region: a fixed-size writable byte store addressed from 0.

Used for the 2 KiB work RAM, PRG RAM, the four 1 KiB name tables and CHR RAM.
Mirroring is not this type's concern; map it through a `Mirror` or register it
more than once on a dispatcher.
*/

use super::Memory;
use crate::error::BusResult;

/// Size of CPU internal RAM (in bytes).
pub const CPU_RAM_SIZE: usize = 0x0800;

pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    /// Create a zero-filled region of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    /// Create a region filled with `value`.
    pub fn filled(size: usize, value: u8) -> Self {
        Self {
            data: vec![value; size],
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Clear contents to 0.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Directly read a byte by index, bypassing the bus.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.data[index]
    }

    /// Directly write a byte by index, bypassing the bus.
    #[inline]
    pub fn set(&mut self, index: usize, value: u8) {
        self.data[index] = value;
    }

    /// Expose the internal slice (read-only). Useful for diagnostics or hashing.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Memory for Ram {
    #[inline]
    fn read(&mut self, address: u16) -> BusResult<u8> {
        Ok(self.data[address as usize])
    }

    #[inline]
    fn write(&mut self, address: u16, data: u8) -> BusResult<()> {
        self.data[address as usize] = data;
        Ok(())
    }
}
