#![doc = r#"
Memory module: the single capability every bus-mapped device implements.

Overview
- `Memory` is the uniform `read(addr) -> byte` / `write(addr, byte)` interface.
  ROM, RAM, the palette, sprite memory, the PPU register file, the DMA port and
  the gamepad all implement it, and so does the `Dispatcher` itself.
- Regions are shared, never exclusively owned: a dispatcher holds
  `SharedMemory` handles (`Rc<RefCell<dyn Memory>>`), so the same region can be
  mapped by several dispatchers or several times inside one.

Modules
- ram: writable fixed-size region
- rom: read-only fixed-size region
- mirror: folds a larger window onto a smaller region
- dispatcher: ordered base/size routing table

Addresses handed to a region are relative to its own base and already checked
by the dispatcher; indexing past the end of a plain region is a bug and panics.
"#]

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::BusResult;

pub mod dispatcher;
pub mod mirror;
pub mod ram;
pub mod rom;

pub use dispatcher::Dispatcher;
pub use mirror::Mirror;
pub use ram::Ram;
pub use rom::Rom;

/// Anything addressable on a bus.
///
/// Reads take `&mut self` because several devices (PPU status, PPU data, the
/// gamepad shift register) change state when read.
pub trait Memory {
    fn read(&mut self, address: u16) -> BusResult<u8>;
    fn write(&mut self, address: u16, data: u8) -> BusResult<()>;
}

/// Shared handle to a bus-mapped region.
pub type SharedMemory = Rc<RefCell<dyn Memory>>;

/// Wrap a device for sharing between dispatchers.
///
/// Returns the concrete handle; it coerces to `SharedMemory` where needed while
/// the caller keeps typed access.
pub fn shared<M: Memory + 'static>(memory: M) -> Rc<RefCell<M>> {
    Rc::new(RefCell::new(memory))
}
