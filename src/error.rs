/*!
Error types shared by the bus, the PPU and the devices mapped onto them.

Two conditions can surface from a bus access:
- `UnmappedAddress`: a dispatcher found no handler covering the address.
- `Protocol`: a device was accessed in a way the modeled hardware has no
  semantics for (e.g. reading a write-only PPU port).

Neither is absorbed here. The integration boundary (`bus::SystemBus`) decides
which unmapped ranges are benign; everything else is fatal for the session.
*/

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NesError {
    #[error("unmapped address ${address:04X}")]
    UnmappedAddress { address: u16 },
    #[error("hardware protocol violation: {0}")]
    Protocol(String),
}

impl NesError {
    /// The offending address of an unmapped access, if this is one.
    pub fn unmapped_address(&self) -> Option<u16> {
        match self {
            NesError::UnmappedAddress { address } => Some(*address),
            NesError::Protocol(_) => None,
        }
    }
}

/// Result alias for bus-level operations.
pub type BusResult<T> = Result<T, NesError>;
