//! Still image source.
//!
//! Decodes one local image at connect time and hands out the same frame on
//! every tick. Useful for bench-testing thresholds against a captured photo.

use anyhow::{Context, Result};

use super::{FrameSource, SourceStats};
use crate::frame::Frame;

pub struct StillImageSource {
    path: String,
    frame: Option<Frame>,
    frames_served: u64,
}

impl StillImageSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            frame: None,
            frames_served: 0,
        }
    }
}

/// Decode an image file into an RGB frame.
pub fn load_frame(path: &str) -> Result<Frame> {
    let image = image::open(path).with_context(|| format!("open image {}", path))?;
    Ok(Frame::from_image(image.to_rgb8()))
}

impl FrameSource for StillImageSource {
    fn connect(&mut self) -> Result<()> {
        let frame = load_frame(&self.path)?;
        log::info!(
            "StillImageSource: loaded {} ({}x{})",
            self.path,
            frame.width(),
            frame.height()
        );
        self.frame = Some(frame);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let frame = self.frame.clone();
        if frame.is_some() {
            self.frames_served += 1;
        }
        Ok(frame)
    }

    fn release(&mut self) {
        self.frame = None;
    }

    fn is_healthy(&self) -> bool {
        self.frame.is_some()
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frames_served,
            source: self.path.clone(),
        }
    }
}
