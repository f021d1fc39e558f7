/*!
ROM region: a fixed-size read-only byte store (PRG and CHR blobs).

Writes are accepted and dropped; cartridges commonly write to ROM space to talk
to mapper hardware, which is not modeled here.
*/

use log::trace;

use super::Memory;
use crate::error::BusResult;

#[derive(Debug, Clone)]
pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Memory for Rom {
    #[inline]
    fn read(&mut self, address: u16) -> BusResult<u8> {
        Ok(self.data[address as usize])
    }

    fn write(&mut self, address: u16, data: u8) -> BusResult<()> {
        trace!("ignored ROM write ${:04X} <- ${:02X}", address, data);
        Ok(())
    }
}
