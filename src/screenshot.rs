/*!
PNG export of the visible 256x240 frame (feature `screenshot`).
*/

use std::path::Path;

use image::{ImageResult, Rgb, RgbImage};

use crate::ppu::{NES_HEIGHT, NES_WIDTH, VideoOutput};

/// Visible frame as an RGB image.
pub fn to_image(output: &dyn VideoOutput) -> RgbImage {
    RgbImage::from_fn(NES_WIDTH as u32, NES_HEIGHT as u32, |x, y| {
        let rgb = output.pixel(x as usize, y as usize);
        Rgb([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8])
    })
}

pub fn save_png(output: &dyn VideoOutput, path: &Path) -> ImageResult<()> {
    to_image(output).save(path)
}
