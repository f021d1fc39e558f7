#![doc = r#"
nemu library crate.

NES picture unit and the address-routing bus it sits on.

Modules:
- memory: `Memory` trait, RAM/ROM regions, mirror adapter and the `Dispatcher`
- ppu: register file, tick-driven timing, background and sprite passes, palette
  and sprite memory, frame output surface
- bus: system bus with benign-miss policy, standard memory map, sprite DMA port
  and per-CPU-tick clock
- controller: gamepad shift register at $4016
- cartridge: iNES v1 loader
- console: scheduler over a pluggable `CpuCore`
- error: bus-level error type
- display (feature `display`): winit + pixels window
- screenshot (feature `screenshot`): PNG export

In tests, shared iNES builders and a scripted CPU are available under
`crate::test_utils`.
"#]

pub mod bus;
pub mod cartridge;
pub mod console;
pub mod controller;
pub mod error;
pub mod memory;
pub mod ppu;

#[cfg(feature = "display")]
pub mod display;
#[cfg(feature = "screenshot")]
pub mod screenshot;

pub use bus::{CpuCore, SystemBus};
pub use cartridge::Cartridge;
pub use console::{Console, ConsoleConfig, ConsoleError};
pub use controller::{Button, Gamepad};
pub use error::{BusResult, NesError};
pub use ppu::{FrameBuffer, Ppu, PpuConfig, VideoOutput};

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
