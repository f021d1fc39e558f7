/*!
Console: owns the system bus, the PPU and a `CpuCore`, and drives them.

- `step` advances one CPU tick (see `bus::clock::step` for the ordering).
- `run_frame` steps until the PPU completes a frame or the stop flag is set.
- `run` steps until the stop flag is set.

Any bus error that escapes the benign-range policy stops the console and is
reported as `ConsoleError::Fatal` with the CPU's program counter.
*/

use std::cell::{Cell, RefCell};
use std::ops::RangeInclusive;
use std::rc::Rc;

use log::{info, warn};
use thiserror::Error;

use crate::bus::{self, CpuCore, DmaPort, SystemBus, SystemDevices};
use crate::cartridge::Cartridge;
use crate::controller::Gamepad;
use crate::error::NesError;
use crate::ppu::{FrameBuffer, Ppu, PpuConfig, VideoOutput};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("fatal error at PC ${pc:04X}: {source}")]
    Fatal {
        pc: u16,
        #[source]
        source: NesError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub ppu: PpuConfig,
    /// System-bus ranges where unmapped accesses are ignored.
    pub benign_ranges: Vec<RangeInclusive<u16>>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            ppu: PpuConfig::default(),
            benign_ranges: bus::default_benign_ranges(),
        }
    }
}

pub struct Console<C: CpuCore> {
    cpu: C,
    bus: SystemBus,
    devices: SystemDevices,
    nmi: Rc<Cell<bool>>,
    stop: Rc<Cell<bool>>,
    cpu_ticks: u64,
}

impl<C: CpuCore> Console<C> {
    pub fn new(cartridge: &Cartridge, cpu: C) -> Self {
        Self::with_config(cartridge, cpu, ConsoleConfig::default())
    }

    pub fn with_config(cartridge: &Cartridge, cpu: C, config: ConsoleConfig) -> Self {
        Self::with_output(cartridge, cpu, config, Box::new(FrameBuffer::new()))
    }

    pub fn with_output(
        cartridge: &Cartridge,
        cpu: C,
        config: ConsoleConfig,
        output: Box<dyn VideoOutput>,
    ) -> Self {
        let mut ppu = Ppu::with_output(cartridge.chr_rom(), config.ppu, output);
        let nmi = Rc::new(Cell::new(false));
        let latch = nmi.clone();
        ppu.set_nmi_callback(move || latch.set(true));

        let devices = SystemDevices::new(ppu, cartridge.prg_block());
        let bus = devices.map(config.benign_ranges);
        info!(
            "console: {} handlers on the system bus",
            bus.dispatcher().handler_count()
        );

        Self {
            cpu,
            bus,
            devices,
            nmi,
            stop: Rc::new(Cell::new(false)),
            cpu_ticks: 0,
        }
    }

    /// Advance one CPU tick (and three PPU ticks).
    pub fn step(&mut self) -> Result<(), ConsoleError> {
        let result = bus::clock::step(
            &mut self.cpu,
            &self.bus,
            &self.devices.ppu,
            &self.devices.dma,
            &self.nmi,
        );
        if result.is_ok() {
            self.cpu_ticks += 1;
        }
        result.map_err(|source| {
            let pc = self.cpu.program_counter();
            warn!("console: stopping at PC ${:04X}: {}", pc, source);
            self.stop.set(true);
            ConsoleError::Fatal { pc, source }
        })
    }

    /// Step until the PPU finishes the current frame or the console is stopped.
    pub fn run_frame(&mut self) -> Result<(), ConsoleError> {
        let start = self.frame_count();
        while !self.stopped() && self.frame_count() == start {
            self.step()?;
        }
        Ok(())
    }

    /// Step until stopped.
    pub fn run(&mut self) -> Result<(), ConsoleError> {
        while !self.stopped() {
            self.step()?;
        }
        Ok(())
    }

    /// Flag checked between ticks; set it from any callback to end `run`.
    pub fn stop_handle(&self) -> Rc<Cell<bool>> {
        self.stop.clone()
    }

    pub fn stopped(&self) -> bool {
        self.stop.get()
    }

    pub fn frame_count(&self) -> u64 {
        self.devices.ppu.borrow().frame_count()
    }

    pub fn cpu_ticks(&self) -> u64 {
        self.cpu_ticks
    }

    pub fn bus(&self) -> &SystemBus {
        &self.bus
    }

    pub fn ppu(&self) -> Rc<RefCell<Ppu>> {
        self.devices.ppu.clone()
    }

    pub fn gamepad(&self) -> Rc<RefCell<Gamepad>> {
        self.devices.gamepad.clone()
    }

    pub fn dma(&self) -> Rc<RefCell<DmaPort>> {
        self.devices.dma.clone()
    }

    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }
}
