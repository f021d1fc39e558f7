#![doc = r#"
PPU registers module

Ports (offset within the 8-byte window; the system bus mirrors $2000-$3FFF onto it)
- 0 control (write): nametable select, increment, pattern tables, NMI enable
- 1 mask (write): stored only
- 2 status (read): returns the flags, clears vblank, resets the address toggle
- 3/4 sprite memory address/data (write): accepted and ignored
- 5 scroll (write x2): x then y
- 6 address (write x2): high byte then low byte, 14-bit result
- 7 data (read/write): one-byte read-ahead through the video bus, auto-increment

Anything else (reading a write-only port, writing status, port >= 8) is a
`NesError::Protocol`.

Notes
- Scroll and address each have their own two-write toggle; a status read
  resets only the address one.
- With `PpuConfig::status_toggle_quirk` on, bit 6 of the returned status value
  alternates between reads (clear on the first, set on the second, ...). This
  only affects the returned value, not the stored flags.
"#]

use bitflags::bitflags;
use log::trace;

use super::Ppu;
use crate::error::{BusResult, NesError};
use crate::memory::Memory;

bitflags! {
    /// Control register (port 0).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Control: u8 {
        const NAMETABLE_LO     = 0b0000_0001;
        const NAMETABLE_HI     = 0b0000_0010;
        const INCREMENT_32     = 0b0000_0100;
        const SPRITE_TABLE     = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_16        = 0b0010_0000;
        const MASTER_SLAVE     = 0b0100_0000;
        const NMI_ENABLE       = 0b1000_0000;
    }
}

bitflags! {
    /// Status register (port 2).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        const VBLANK          = 0b1000_0000;
    }
}

impl Control {
    /// Base of the selected name table ($2000, $2400, $2800 or $2C00).
    #[inline]
    pub fn name_table_base(self) -> u16 {
        0x2000 + (self.bits() as u16 & 0x03) * 0x400
    }

    #[inline]
    pub fn background_pattern_base(self) -> u16 {
        if self.contains(Control::BACKGROUND_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    #[inline]
    pub fn sprite_pattern_base(self) -> u16 {
        if self.contains(Control::SPRITE_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    #[inline]
    pub fn address_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) { 32 } else { 1 }
    }
}

pub const PORT_CONTROL: u16 = 0;
pub const PORT_MASK: u16 = 1;
pub const PORT_STATUS: u16 = 2;
pub const PORT_OAM_ADDRESS: u16 = 3;
pub const PORT_OAM_DATA: u16 = 4;
pub const PORT_SCROLL: u16 = 5;
pub const PORT_ADDRESS: u16 = 6;
pub const PORT_DATA: u16 = 7;

impl Ppu {
    /// CPU-visible register read; `port` is the offset inside the register window.
    pub fn read_register(&mut self, port: u16) -> BusResult<u8> {
        match port {
            PORT_STATUS => Ok(self.read_status()),
            PORT_DATA => {
                let value = self.data_latch;
                self.data_latch = self.memory.read(self.address)?;
                self.advance_address();
                Ok(value)
            }
            _ => Err(NesError::Protocol(format!("invalid register read: {}", port))),
        }
    }

    /// CPU-visible register write; `port` is the offset inside the register window.
    pub fn write_register(&mut self, port: u16, data: u8) -> BusResult<()> {
        match port {
            PORT_CONTROL => self.ctrl = Control::from_bits_retain(data),
            PORT_MASK => self.mask = data,
            PORT_OAM_ADDRESS | PORT_OAM_DATA => {
                trace!("ppu: ignoring sprite memory port {} write {:#04x}", port, data);
            }
            PORT_SCROLL => {
                if self.first_scroll_write {
                    self.scroll_x = data;
                } else {
                    self.scroll_y = data;
                }
                self.first_scroll_write = !self.first_scroll_write;
            }
            PORT_ADDRESS => {
                if self.first_write {
                    self.address = (self.address & 0x00FF) | ((data as u16) << 8);
                } else {
                    self.address = ((self.address & 0xFF00) | data as u16) & 0x3FFF;
                }
                self.first_write = !self.first_write;
            }
            PORT_DATA => {
                self.memory.write(self.address, data)?;
                self.advance_address();
            }
            _ => {
                return Err(NesError::Protocol(format!("invalid register write: {}", port)));
            }
        }
        Ok(())
    }

    fn read_status(&mut self) -> u8 {
        self.status_reads = self.status_reads.wrapping_add(1);
        self.first_write = true;

        let mut value = self.status.bits();
        if self.config.status_toggle_quirk && self.status_reads % 2 == 0 {
            value |= Status::SPRITE_ZERO_HIT.bits();
        }
        self.status.remove(Status::VBLANK);
        value
    }

    #[inline]
    fn advance_address(&mut self) {
        self.address = self.address.wrapping_add(self.ctrl.address_increment()) & 0x3FFF;
    }
}

impl Memory for Ppu {
    fn read(&mut self, address: u16) -> BusResult<u8> {
        self.read_register(address)
    }

    fn write(&mut self, address: u16, data: u8) -> BusResult<()> {
        self.write_register(address, data)
    }
}
