/*!
Gamepad: serial button input mapped at $4016.

Behavior:
- Buttons are a bitmask in the order the CPU shifts them out:
  A, B, Select, Start, Up, Down, Left, Right (bit 0 through bit 7).
- Writing bit 0 = 1 raises strobe: the live buttons are latched continuously and
  every read returns the A button.
- Writing bit 0 = 0 drops strobe: reads shift the latched snapshot out one bit
  at a time, A first. After 8 reads, further reads return 1.

The host feeds the live state through `set_button` / `set_state_mask`; the
`display` feature does this from the keyboard.
*/

use crate::error::BusResult;
use crate::memory::Memory;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    #[inline]
    pub fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Gamepad {
    // Live button states. Bit set = pressed.
    buttons: u8,
    latched: u8,
    strobe: bool,
    // 0..7 -> A..Right; 8 -> exhausted
    index: u8,
}

impl Gamepad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons |= button.mask();
        } else {
            self.buttons &= !button.mask();
        }
    }

    pub fn press(&mut self, button: Button) {
        self.set_button(button, true);
    }

    pub fn release(&mut self, button: Button) {
        self.set_button(button, false);
    }

    /// Replace the live state. Bit layout follows `Button::mask`.
    pub fn set_state_mask(&mut self, mask: u8) {
        self.buttons = mask;
    }

    pub fn write_strobe(&mut self, value: u8) {
        self.strobe = (value & 1) != 0;
        if self.strobe {
            self.latch();
        }
    }

    /// One serial read; only bit 0 is meaningful.
    pub fn read_bit(&mut self) -> u8 {
        if self.strobe {
            self.latch();
            return self.latched & 1;
        }
        if self.index < 8 {
            let bit = (self.latched >> self.index) & 1;
            self.index += 1;
            bit
        } else {
            1
        }
    }

    #[inline]
    fn latch(&mut self) {
        self.latched = self.buttons;
        self.index = 0;
    }

    pub fn strobe(&self) -> bool {
        self.strobe
    }

    pub fn current_mask(&self) -> u8 {
        self.buttons
    }
}

impl Memory for Gamepad {
    fn read(&mut self, _address: u16) -> BusResult<u8> {
        Ok(self.read_bit())
    }

    fn write(&mut self, _address: u16, data: u8) -> BusResult<()> {
        self.write_strobe(data);
        Ok(())
    }
}
