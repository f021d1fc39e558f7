#![doc = r#"
Bus module: the CPU-visible system bus.

Overview
- `SystemBus` wraps the system `Dispatcher` and applies the unmapped-address
  policy at the integration boundary: misses inside the configured benign ranges
  (by default the audio registers, which are not emulated) read as 0 and swallow
  writes; every other miss surfaces as `NesError::UnmappedAddress`.
- `SystemDevices::map` builds the standard memory map over shared device handles.

Memory map (registration order)
- $0000-$1FFF: 2 KiB work RAM, mirrored every $800
- $2000-$3FFF: PPU register window, mirrored every 8 bytes
- $4014: sprite DMA port
- $4016: gamepad
- $6000-$7FFF: 8 KiB PRG RAM
- $8000-$FFFF: PRG ROM; a 16 KiB image is registered again at $C000

Modules and responsibilities
- dma: the $4014 port and the page copy into sprite memory
- clock: per-CPU-tick ordering (CPU, DMA, PPU x3, NMI forwarding)
"#]

use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::rc::Rc;

use log::trace;

use crate::controller::Gamepad;
use crate::error::{BusResult, NesError};
use crate::memory::{Dispatcher, Memory, Mirror, Ram, Rom, ram::CPU_RAM_SIZE, shared};
use crate::ppu::Ppu;

pub mod clock;
pub mod dma;

pub use clock::{CpuCore, PPU_TICKS_PER_CPU_TICK};
pub use dma::DmaPort;

pub const PPU_REGISTERS_BASE: u16 = 0x2000;
pub const PPU_REGISTER_COUNT: u16 = 8;
pub const DMA_PORT: u16 = 0x4014;
pub const GAMEPAD_PORT: u16 = 0x4016;
pub const PRG_RAM_BASE: u16 = 0x6000;
pub const PRG_RAM_SIZE: usize = 0x2000;
pub const PRG_ROM_BASE: u16 = 0x8000;

/// Address ranges whose misses are not errors: $4000-$4013, $4015, $4017.
pub fn default_benign_ranges() -> Vec<RangeInclusive<u16>> {
    vec![0x4000..=0x4013, 0x4015..=0x4015, 0x4017..=0x4017]
}

pub struct SystemBus {
    dispatcher: Dispatcher,
    benign: Vec<RangeInclusive<u16>>,
}

impl SystemBus {
    pub fn new(dispatcher: Dispatcher, benign: Vec<RangeInclusive<u16>>) -> Self {
        Self { dispatcher, benign }
    }

    pub fn is_benign(&self, address: u16) -> bool {
        self.benign.iter().any(|r| r.contains(&address))
    }

    pub fn read(&self, address: u16) -> BusResult<u8> {
        match self.dispatcher.read(address) {
            Err(NesError::UnmappedAddress { address }) if self.is_benign(address) => {
                trace!("bus: ignoring read from unmapped ${:04X}", address);
                Ok(0)
            }
            other => other,
        }
    }

    pub fn write(&self, address: u16, data: u8) -> BusResult<()> {
        match self.dispatcher.write(address, data) {
            Err(NesError::UnmappedAddress { address }) if self.is_benign(address) => {
                trace!("bus: ignoring write {:#04x} to unmapped ${:04X}", data, address);
                Ok(())
            }
            other => other,
        }
    }

    /// Little-endian 16-bit read (e.g. interrupt vectors).
    pub fn read_word(&self, address: u16) -> BusResult<u16> {
        let lo = self.read(address)? as u16;
        let hi = self.read(address.wrapping_add(1))? as u16;
        Ok((hi << 8) | lo)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl Memory for SystemBus {
    fn read(&mut self, address: u16) -> BusResult<u8> {
        SystemBus::read(self, address)
    }

    fn write(&mut self, address: u16, data: u8) -> BusResult<()> {
        SystemBus::write(self, address, data)
    }
}

/// Shared handles to every device on the system bus.
pub struct SystemDevices {
    pub ram: Rc<RefCell<Ram>>,
    pub ppu: Rc<RefCell<Ppu>>,
    pub dma: Rc<RefCell<DmaPort>>,
    pub gamepad: Rc<RefCell<Gamepad>>,
    pub prg_ram: Rc<RefCell<Ram>>,
    pub prg_rom: Rc<RefCell<Rom>>,
}

impl SystemDevices {
    /// Fresh RAM, DMA port and gamepad around the given PPU and PRG image.
    pub fn new(ppu: Ppu, prg_rom: Rom) -> Self {
        Self {
            ram: shared(Ram::new(CPU_RAM_SIZE)),
            ppu: shared(ppu),
            dma: shared(DmaPort::new()),
            gamepad: shared(Gamepad::new()),
            prg_ram: shared(Ram::new(PRG_RAM_SIZE)),
            prg_rom: shared(prg_rom),
        }
    }

    /// Register every device at its standard location.
    pub fn map(&self, benign: Vec<RangeInclusive<u16>>) -> SystemBus {
        let mut d = Dispatcher::new();

        let ram = Mirror::new(self.ram.clone(), CPU_RAM_SIZE as u16);
        d.register_range(0x0000, 0x2000, shared(ram));

        let registers = Mirror::new(self.ppu.clone(), PPU_REGISTER_COUNT);
        d.register_range(PPU_REGISTERS_BASE, 0x2000, shared(registers));

        d.register_handler(DMA_PORT, self.dma.clone());
        d.register_handler(GAMEPAD_PORT, self.gamepad.clone());
        d.register_range(PRG_RAM_BASE, PRG_RAM_SIZE as u16, self.prg_ram.clone());

        let prg_len = self.prg_rom.borrow().size().min(0x8000) as u16;
        d.register_range(PRG_ROM_BASE, prg_len, self.prg_rom.clone());
        if prg_len == 0x4000 {
            d.register_range(0xC000, prg_len, self.prg_rom.clone());
        }

        SystemBus::new(d, benign)
    }
}

#[cfg(test)]
mod tests;
