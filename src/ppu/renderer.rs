#![doc = r#"
PPU renderer module

Responsibilities
- `Ppu::tick`: advance one PPU tick, render each scanline as it completes and
  handle the frame boundary.
- `Ppu::render_scan_line`: compose one output row from the background pass
  (`fetch.rs`) and the sprite pass (`sprite.rs`).

Frame boundary (scan line 260 -> 0)
1. present the output surface
2. set vblank, clear sprite-0 hit
3. bump the frame counter
4. call the NMI callback if control bit 7 is set

The callback runs last, with the PPU already in its next-frame state, so it may
do anything that does not re-enter this `Ppu`.
"#]

use log::debug;

use super::*;

impl Ppu {
    /// Advance one tick. Every 341st tick completes a scanline.
    pub fn tick(&mut self) -> BusResult<()> {
        self.tick_counter += 1;
        if self.tick_counter < TICKS_PER_LINE {
            return Ok(());
        }

        let rendered = self.render_scan_line(self.scan_line);
        self.lines_rendered += 1;
        self.tick_counter = 0;
        self.scan_line += 1;

        if self.scan_line == LINES_PER_FRAME {
            self.finish_frame();
        } else if self.scan_line == FIRST_VISIBLE_LINE {
            self.status.remove(Status::VBLANK);
        }
        rendered
    }

    fn finish_frame(&mut self) {
        self.output.present();
        self.status.insert(Status::VBLANK);
        self.status.remove(Status::SPRITE_ZERO_HIT);
        self.scan_line = 0;
        self.frames += 1;
        debug!("ppu: frame {} complete", self.frames);

        if self.ctrl.contains(Control::NMI_ENABLE) {
            if let Some(callback) = self.nmi_callback.as_mut() {
                callback();
            }
        }
    }

    /// Render scanline `line` into the output. Lines before the first visible
    /// one produce nothing.
    pub fn render_scan_line(&mut self, line: u16) -> BusResult<()> {
        if line < FIRST_VISIBLE_LINE || line >= FIRST_VISIBLE_LINE + NES_HEIGHT as u16 {
            return Ok(());
        }
        let row = (line - FIRST_VISIBLE_LINE) as usize;

        let mut pixels = [0u32; NES_WIDTH];
        self.background_pass(row, &mut pixels)?;
        self.sprite_pass(row, &mut pixels)?;
        self.output.row_mut(row).copy_from_slice(&pixels);
        Ok(())
    }

    /// Colour for a palette offset ($00-$1F): palette byte, low 6 bits, master table.
    pub(in crate::ppu) fn palette_colour(&self, offset: u8) -> BusResult<u32> {
        let entry = self.memory.read(0x3F00 + offset as u16)?;
        Ok(RGB_PALETTE[(entry & 0x3F) as usize])
    }
}
