/*!
Frame output surface.

The PPU writes one 32-bit `0x00RRGGBB` word per pixel into a 256x240 surface
owned by the host and calls `present` once per frame. Rows are `pitch()` words
apart; the host picks the pitch (at least `NES_WIDTH`).
*/

use super::{NES_HEIGHT, NES_WIDTH};

pub trait VideoOutput {
    /// Row stride in pixels.
    fn pitch(&self) -> usize;
    fn pixels(&self) -> &[u32];
    fn pixels_mut(&mut self) -> &mut [u32];
    /// Frame finished; flip it to the screen.
    fn present(&mut self);

    /// Mutable view of one visible row.
    fn row_mut(&mut self, y: usize) -> &mut [u32] {
        let start = y * self.pitch();
        &mut self.pixels_mut()[start..start + NES_WIDTH]
    }

    /// Copy of pixel (x, y).
    fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels()[y * self.pitch() + x]
    }
}

/// In-memory surface; the default output for a `Ppu`.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    pitch: usize,
    pixels: Vec<u32>,
    presented: u64,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::with_pitch(NES_WIDTH)
    }

    /// Surface with rows `pitch` pixels apart. Pitches below the screen width
    /// are raised to it.
    pub fn with_pitch(pitch: usize) -> Self {
        let pitch = pitch.max(NES_WIDTH);
        Self {
            pitch,
            pixels: vec![0; pitch * NES_HEIGHT],
            presented: 0,
        }
    }

    /// Number of `present` calls so far.
    pub fn frames_presented(&self) -> u64 {
        self.presented
    }
}

impl VideoOutput for FrameBuffer {
    fn pitch(&self) -> usize {
        self.pitch
    }

    fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_respect_pitch() {
        let mut fb = FrameBuffer::with_pitch(300);
        fb.row_mut(1)[0] = 0xABCDEF;
        assert_eq!(fb.pixels()[300], 0xABCDEF);
        assert_eq!(fb.pixel(0, 1), 0xABCDEF);
    }

    #[test]
    fn narrow_pitch_is_raised_to_screen_width() {
        let fb = FrameBuffer::with_pitch(10);
        assert_eq!(fb.pitch(), NES_WIDTH);
    }

    #[test]
    fn present_counts_frames() {
        let mut fb = FrameBuffer::new();
        assert_eq!(fb.frames_presented(), 0);
        fb.present();
        fb.present();
        assert_eq!(fb.frames_presented(), 2);
    }
}
