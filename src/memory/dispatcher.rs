/*!
Dispatcher: routes a 16-bit address space to registered handlers.

Semantics
- Handlers are `(base, size, target)` triples kept in registration order.
- A lookup scans that order and takes the first handler whose `[base, base + size)`
  contains the address; overlapping ranges are allowed and the earlier one wins.
- The target sees `address - base`.
- No match yields `NesError::UnmappedAddress` carrying the address. Callers may
  treat selected misses as benign; the dispatcher never does.

`read`/`write` take `&self`: registration happens once during setup, after which
the table is immutable and the targets carry their own interior mutability. That
lets a device reached through this dispatcher read through another one (or this
one) while the access is in flight.
*/

use super::{Memory, SharedMemory};
use crate::error::{BusResult, NesError};

struct Handler {
    base: u16,
    size: u16,
    target: SharedMemory,
}

impl Handler {
    #[inline]
    fn contains(&self, address: u16) -> bool {
        // 32-bit end so a handler reaching $FFFF does not overflow.
        let end = self.base as u32 + self.size as u32;
        (self.base as u32..end).contains(&(address as u32))
    }
}

#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single-byte handler at `base`.
    pub fn register_handler(&mut self, base: u16, target: SharedMemory) {
        self.register_range(base, 1, target);
    }

    /// Register a handler covering `[base, base + size)`.
    pub fn register_range(&mut self, base: u16, size: u16, target: SharedMemory) {
        self.handlers.push(Handler { base, size, target });
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    fn find(&self, address: u16) -> BusResult<&Handler> {
        self.handlers
            .iter()
            .find(|h| h.contains(address))
            .ok_or(NesError::UnmappedAddress { address })
    }

    pub fn read(&self, address: u16) -> BusResult<u8> {
        let h = self.find(address)?;
        h.target.borrow_mut().read(address - h.base)
    }

    pub fn write(&self, address: u16, data: u8) -> BusResult<()> {
        let h = self.find(address)?;
        h.target.borrow_mut().write(address - h.base, data)
    }
}

impl Memory for Dispatcher {
    fn read(&mut self, address: u16) -> BusResult<u8> {
        Dispatcher::read(self, address)
    }

    fn write(&mut self, address: u16, data: u8) -> BusResult<()> {
        Dispatcher::write(self, address, data)
    }
}
