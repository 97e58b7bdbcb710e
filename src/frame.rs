//! Frame container passed from ingest through classification to display.
//!
//! A `Frame` is an RGB buffer that stays immutable while it is classified.
//! Rendering works on a copy (`overlay::annotate`), so the classifier input
//! is never touched by the overlay.

use anyhow::{anyhow, Result};
use image::{Rgb, RgbImage};

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap packed RGB24 bytes. The length must be exactly `width * height * 3`.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("RGB frame dimensions overflow"))? as usize;
        if pixels.len() != expected {
            return Err(anyhow!(
                "RGB frame length mismatch: expected {}, got {}",
                expected,
                pixels.len()
            ));
        }
        let image = RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow!("RGB frame buffer rejected ({}x{})", width, height))?;
        Ok(Self { image })
    }

    /// Solid frame of a single color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(rgb)),
        }
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// A frame with no pixels is treated as a missed capture.
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Paint an axis-aligned block, clipped to the frame. Used by the
    /// synthetic source and by tests to stage scenes.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, rgb: [u8; 3]) {
        let x_end = x.saturating_add(width).min(self.width());
        let y_end = y.saturating_add(height).min(self.height());
        for py in y.min(y_end)..y_end {
            for px in x.min(x_end)..x_end {
                self.image.put_pixel(px, py, Rgb(rgb));
            }
        }
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    /// Pack into 0RGB words, the layout window buffers expect.
    pub fn to_argb(&self) -> Vec<u32> {
        self.image
            .pixels()
            .map(|Rgb([r, g, b])| ((*r as u32) << 16) | ((*g as u32) << 8) | *b as u32)
            .collect()
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}
