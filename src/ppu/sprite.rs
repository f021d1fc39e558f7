#![doc = r#"
PPU sprite pass

Runs after the background pass on the same row buffer. All 64 entries are
visited from the last to the first, so on overlap the lower-numbered sprite is
drawn last and ends up on top. Per sprite:
- skipped unless the row lies in `[y, y + 8)` (8x8 sprites only)
- row inside the sprite is mirrored for vertical flip
- pattern planes come from the table selected by control bit 3
- bit order is reversed for horizontal flip
- colour index 0 is transparent; otherwise palette offset $10 + group*4 + index
- pixels past x = 255 are dropped

Not modeled: the priority bit, the eight-per-line limit, sprite-0 hit.
"#]

use super::*;

impl Ppu {
    pub(in crate::ppu) fn sprite_pass(
        &self,
        row: usize,
        pixels: &mut [u32; NES_WIDTH],
    ) -> BusResult<()> {
        let pattern_base = self.ctrl.sprite_pattern_base();
        let oam = self.oam.borrow();

        for index in (0..oam::SPRITE_COUNT).rev() {
            let sprite = oam.sprite(index);
            if !sprite.covers_row(row) {
                continue;
            }

            let mut fine_y = (row - sprite.y as usize) as u16;
            if sprite.flip_v() {
                fine_y = 7 - fine_y;
            }
            let plane = pattern_base + sprite.pattern_index as u16 * 16 + fine_y;
            let mut low = self.memory.read(plane)?;
            let mut high = self.memory.read(plane + 8)?;
            if sprite.flip_h() {
                low = low.reverse_bits();
                high = high.reverse_bits();
            }

            for i in 0..8usize {
                let x = sprite.x as usize + i;
                if x >= NES_WIDTH {
                    break;
                }
                let bit = 7 - i;
                let colour = ((low >> bit) & 1) | (((high >> bit) & 1) << 1);
                if colour == 0 {
                    continue;
                }
                let offset = 0x10 + (sprite.palette_group() << 2) + colour;
                pixels[x] = self.palette_colour(offset)?;
            }
        }
        Ok(())
    }
}
