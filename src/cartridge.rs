/*!
Cartridge: iNES (v1) loader.

Features:
- Parse the 16-byte iNES header from bytes or a file path
- Extract PRG ROM (16 KiB units) and CHR ROM (8 KiB units), skipping a 512-byte
  trainer when flags 6 bit 2 says one is present
- Report the mapper number, mirroring and battery flags

Notes:
- NES 2.0 images are rejected.
- There is no bank switching: PRG is mapped as one fixed block (a 16 KiB image
  repeats at $C000) and only the first 8 KiB of CHR are visible to the PPU.
  Images declaring a mapper other than 0 still load; the number is logged.
- A CHR size of 0 yields an empty CHR blob; the PPU then maps CHR RAM.
- Mirroring is reported but not applied: the PPU always maps four independent
  name tables.
*/

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::memory::Rom;

pub const INES_HEADER_SIZE: usize = 16;
pub const TRAINER_SIZE: usize = 512;
pub const PRG_UNIT: usize = 16 * 1024;
pub const CHR_UNIT: usize = 8 * 1024;

#[derive(Error, Debug)]
pub enum CartridgeError {
    #[error("image too small for an iNES header ({0} bytes)")]
    TooShort(usize),
    #[error("invalid iNES header magic (expected NES<1A>)")]
    BadMagic,
    #[error("NES 2.0 images are not supported")]
    Nes2Unsupported,
    #[error("image truncated in {section}: need {needed} bytes, have {available}")]
    Truncated {
        section: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

#[derive(Clone, Debug)]
pub struct Cartridge {
    prg: Vec<u8>,
    chr: Vec<u8>,
    mapper_id: u8,
    mirroring: Mirroring,
    battery: bool,
    has_trainer: bool,
}

impl Cartridge {
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < INES_HEADER_SIZE {
            return Err(CartridgeError::TooShort(data.len()));
        }
        if &data[0..4] != b"NES\x1A" {
            return Err(CartridgeError::BadMagic);
        }

        let prg_len = data[4] as usize * PRG_UNIT;
        let chr_len = data[5] as usize * CHR_UNIT;
        let flags6 = data[6];
        let flags7 = data[7];

        if (flags7 & 0x0C) == 0x08 {
            return Err(CartridgeError::Nes2Unsupported);
        }

        let mapper_id = (flags7 & 0xF0) | (flags6 >> 4);
        let mirroring = if flags6 & 0b0000_1000 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0b0000_0001 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let battery = flags6 & 0b0000_0010 != 0;
        let has_trainer = flags6 & 0b0000_0100 != 0;

        let mut offset = INES_HEADER_SIZE;
        if has_trainer {
            offset += TRAINER_SIZE;
        }
        let prg = section(data, offset, prg_len, "PRG ROM")?.to_vec();
        offset += prg_len;
        let chr = section(data, offset, chr_len, "CHR ROM")?.to_vec();

        info!(
            "cartridge: {} KiB PRG, {} KiB CHR, mapper {}, {:?} mirroring",
            prg_len / 1024,
            chr_len / 1024,
            mapper_id,
            mirroring
        );
        if mapper_id != 0 {
            warn!("cartridge: mapper {} has no bank switching here", mapper_id);
        }

        Ok(Self {
            prg,
            chr,
            mapper_id,
            mirroring,
            battery,
            has_trainer,
        })
    }

    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| CartridgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ines_bytes(&bytes)
    }

    pub fn prg_rom(&self) -> &[u8] {
        &self.prg
    }

    pub fn chr_rom(&self) -> &[u8] {
        &self.chr
    }

    /// PRG as a read-only block ready to be mapped at $8000.
    pub fn prg_block(&self) -> Rom {
        Rom::from_slice(&self.prg)
    }

    pub fn mapper_id(&self) -> u8 {
        self.mapper_id
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn has_battery(&self) -> bool {
        self.battery
    }

    pub fn has_trainer(&self) -> bool {
        self.has_trainer
    }
}

fn section<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    name: &'static str,
) -> Result<&'a [u8], CartridgeError> {
    data.get(offset..offset + len)
        .ok_or(CartridgeError::Truncated {
            section: name,
            needed: offset + len,
            available: data.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_ines;

    #[test]
    fn parses_sizes_and_flags() {
        let rom = build_ines(2, 1, 0x01 | 0x02 | 0x30, 0x40, None);
        let cart = Cartridge::from_ines_bytes(&rom).unwrap();
        assert_eq!(cart.prg_rom().len(), 2 * PRG_UNIT);
        assert_eq!(cart.chr_rom().len(), CHR_UNIT);
        assert_eq!(cart.mapper_id(), 0x43);
        assert_eq!(cart.mirroring(), Mirroring::Vertical);
        assert!(cart.has_battery());
        assert!(!cart.has_trainer());
        assert_eq!(cart.prg_rom()[0], 0xAA);
        assert_eq!(cart.chr_rom()[0], 0xCC);
    }

    #[test]
    fn skips_trainer() {
        let trainer = [0x55u8; TRAINER_SIZE];
        let rom = build_ines(1, 1, 0x04, 0, Some(&trainer));
        let cart = Cartridge::from_ines_bytes(&rom).unwrap();
        assert!(cart.has_trainer());
        assert!(cart.prg_rom().iter().all(|&b| b == 0xAA));
        assert!(cart.chr_rom().iter().all(|&b| b == 0xCC));
    }

    #[test]
    fn zero_chr_units_gives_empty_chr() {
        let rom = build_ines(1, 0, 0x08, 0, None);
        let cart = Cartridge::from_ines_bytes(&rom).unwrap();
        assert!(cart.chr_rom().is_empty());
        assert_eq!(cart.mirroring(), Mirroring::FourScreen);
        assert_eq!(cart.prg_block().size(), PRG_UNIT);
    }

    #[test]
    fn rejects_bad_images() {
        assert!(matches!(
            Cartridge::from_ines_bytes(&[0u8; 4]),
            Err(CartridgeError::TooShort(4))
        ));

        let mut rom = build_ines(1, 1, 0, 0, None);
        rom[3] = 0;
        assert!(matches!(
            Cartridge::from_ines_bytes(&rom),
            Err(CartridgeError::BadMagic)
        ));

        let rom = build_ines(1, 1, 0, 0x08, None);
        assert!(matches!(
            Cartridge::from_ines_bytes(&rom),
            Err(CartridgeError::Nes2Unsupported)
        ));

        let mut rom = build_ines(1, 1, 0, 0, None);
        rom.truncate(INES_HEADER_SIZE + PRG_UNIT + 100);
        match Cartridge::from_ines_bytes(&rom) {
            Err(CartridgeError::Truncated { section, needed, .. }) => {
                assert_eq!(section, "CHR ROM");
                assert_eq!(needed, INES_HEADER_SIZE + PRG_UNIT + CHR_UNIT);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Cartridge::from_ines_file("/nonexistent/game.nes").unwrap_err();
        assert!(matches!(err, CartridgeError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/game.nes"));
    }
}
