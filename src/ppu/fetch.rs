#![doc = r#"
PPU background pass

For each of the 256 pixels of a visible row:
- column = x + horizontal scroll; columns past 255 come from the horizontally
  adjacent name table (base XOR $400) at column % 256
- tile index from the name table, palette group from the attribute table
  (one byte per 32x32 block, two bits per 16x16 quadrant)
- two pattern bitplanes from the table selected by control bit 4 ($0000 or
  $1000), the same bit hardware uses; it is not pinned to $1000
- colour index 0 is the universal backdrop ($3F00); otherwise the group is
  folded in before the palette lookup

Not applied: vertical scroll, mask-register enables.
"#]

use super::*;

impl Ppu {
    pub(in crate::ppu) fn background_pass(
        &self,
        row: usize,
        pixels: &mut [u32; NES_WIDTH],
    ) -> BusResult<()> {
        let selected = self.ctrl.name_table_base();
        let pattern_base = self.ctrl.background_pattern_base();
        let fine_y = (row % 8) as u16;

        for (x, pixel) in pixels.iter_mut().enumerate() {
            let col = x + self.scroll_x as usize;
            let name_table = if col >= NES_WIDTH {
                selected ^ 0x0400
            } else {
                selected
            };
            let c = col % NES_WIDTH;

            let tile_offset = (row / 8) * 32 + c / 8;
            let tile = self.memory.read(name_table + tile_offset as u16)?;

            let attr_offset = 0x3C0 + (row / 32) * 8 + c / 32;
            let attr = self.memory.read(name_table + attr_offset as u16)?;
            let shift = (((row / 16) % 2) * 2 + (c / 16) % 2) * 2;
            let group = (attr >> shift) & 0x03;

            let plane = pattern_base + tile as u16 * 16 + fine_y;
            let low = self.memory.read(plane)?;
            let high = self.memory.read(plane + 8)?;
            let bit = 7 - (c % 8);
            let index = ((low >> bit) & 1) | (((high >> bit) & 1) << 1);

            let offset = if index == 0 { 0 } else { index | (group << 2) };
            *pixel = self.palette_colour(offset)?;
        }
        Ok(())
    }
}
