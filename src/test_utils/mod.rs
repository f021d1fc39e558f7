//! Shared test utilities: iNES image builders and a scripted CPU.
//!
//! iNES header fields used here:
//! - bytes[0..4] = b"NES\x1A"
//! - byte 4 = PRG ROM size in 16 KiB units
//! - byte 5 = CHR ROM size in 8 KiB units (0 => no CHR ROM; the PPU maps CHR RAM)
//! - byte 6 = Flags 6 (mirroring, battery, trainer, mapper low nibble)
//! - byte 7 = Flags 7 (NES 2.0 indicator, mapper high nibble)
//! - bytes 8..15 = zero

#![allow(dead_code)]

use std::collections::VecDeque;

use crate::bus::{CpuCore, SystemBus};
use crate::error::BusResult;

/// Build an iNES (v1) image. PRG is filled with 0xAA, CHR with 0xCC.
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(16 + 512 + prg_16k * 0x4000 + chr_8k * 0x2000);

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.extend_from_slice(&[0u8; 8]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.extend(std::iter::repeat_n(0xAA, prg_16k * 0x4000));
    bytes.extend(std::iter::repeat_n(0xCC, chr_8k * 0x2000));
    bytes
}

/// Single-bank NROM image with `prg` at $8000 and every vector pointing there.
/// CHR is zero-filled.
pub fn build_nrom(prg: &[u8], chr_8k: usize) -> Vec<u8> {
    assert!(prg.len() <= 0x3FFA, "program must leave room for the vectors");
    let mut rom = build_ines(1, 0, 0, 0, None);
    rom[5] = chr_8k as u8;

    let bank = &mut rom[16..16 + 0x4000];
    bank.fill(0);
    bank[..prg.len()].copy_from_slice(prg);
    for vector in [0x3FFA, 0x3FFC, 0x3FFE] {
        bank[vector] = 0x00;
        bank[vector + 1] = 0x80;
    }

    rom.extend(std::iter::repeat_n(0x00, chr_8k * 0x2000));
    rom
}

/// CPU double that performs one scripted bus access per tick, then idles.
///
/// `(address, Some(v))` writes `v`; `(address, None)` reads and records the
/// value. The program counter starts at $8000 and advances after each
/// successful tick.
#[derive(Debug, Default)]
pub struct ScriptedCpu {
    script: VecDeque<(u16, Option<u8>)>,
    pub reads: Vec<u8>,
    pub ticks: u64,
    pub nmis: u32,
    pub pc: u16,
}

impl ScriptedCpu {
    pub fn new(script: Vec<(u16, Option<u8>)>) -> Self {
        Self {
            script: script.into(),
            pc: 0x8000,
            ..Self::default()
        }
    }

    pub fn idle() -> Self {
        Self::new(Vec::new())
    }
}

impl CpuCore for ScriptedCpu {
    fn tick(&mut self, bus: &SystemBus) -> BusResult<()> {
        self.ticks += 1;
        if let Some((address, op)) = self.script.pop_front() {
            match op {
                Some(value) => bus.write(address, value)?,
                None => self.reads.push(bus.read(address)?),
            }
        }
        self.pc = self.pc.wrapping_add(1);
        Ok(())
    }

    fn nmi(&mut self) {
        self.nmis += 1;
    }

    fn program_counter(&self) -> u16 {
        self.pc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_ines() {
        let rom = build_ines(2, 1, 0x01, 0x00, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[6], 0x01);
        assert_eq!(rom.len(), 16 + 2 * 0x4000 + 0x2000);
    }

    #[test]
    fn nrom_vectors_point_at_program_start() {
        let rom = build_nrom(&[0xA9, 0x01], 1);
        assert_eq!(rom[16], 0xA9);
        assert_eq!(&rom[16 + 0x3FFC..16 + 0x3FFE], &[0x00, 0x80]);
        assert_eq!(rom.len(), 16 + 0x4000 + 0x2000);
    }
}
