//! Synthetic scene source (`stub://...`).
//!
//! Produces a dark background with a crimson block drifting left to right and
//! a green block that appears in alternating 50-frame windows. The scene is a
//! pure function of the frame counter.

use anyhow::Result;

use super::{FrameSource, SourceStats};
use crate::frame::Frame;

pub const SYNTHETIC_WIDTH: u32 = 640;
pub const SYNTHETIC_HEIGHT: u32 = 480;

const BACKGROUND: [u8; 3] = [24, 24, 24];
const RIPE: [u8; 3] = [220, 20, 60];
const UNRIPE: [u8; 3] = [30, 180, 40];
const BLOCK: u32 = 60;
const GREEN_PERIOD: u64 = 50;

pub struct SyntheticSource {
    name: String,
    frame_count: u64,
}

impl SyntheticSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frame_count: 0,
        }
    }

    /// Scene for a given frame index.
    pub fn render(index: u64) -> Frame {
        let mut frame = Frame::filled(SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT, BACKGROUND);

        let travel = (SYNTHETIC_WIDTH - BLOCK) as u64;
        let x = ((index * 4) % travel) as u32;
        frame.fill_rect(x, 80, BLOCK, BLOCK, RIPE);

        if (index / GREEN_PERIOD) % 2 == 1 {
            frame.fill_rect(400, 320, BLOCK, BLOCK, UNRIPE);
        }
        frame
    }
}

impl FrameSource for SyntheticSource {
    /// Synthetic sources are always "connected".
    fn connect(&mut self) -> Result<()> {
        log::info!("SyntheticSource: connected to {} (synthetic)", self.name);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let frame = Self::render(self.frame_count);
        self.frame_count += 1;
        Ok(Some(frame))
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            source: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::color::ColorClass;

    #[test]
    fn scene_alternates_green_presence() {
        let early = classify(&SyntheticSource::render(0));
        assert!(early.is_active(ColorClass::Red));
        assert!(!early.is_active(ColorClass::Green));

        let later = classify(&SyntheticSource::render(GREEN_PERIOD));
        assert!(later.is_active(ColorClass::Red));
        assert!(later.is_active(ColorClass::Green));
    }

    #[test]
    fn frames_count_up() -> Result<()> {
        let mut source = SyntheticSource::new("stub://count");
        source.connect()?;
        for _ in 0..3 {
            assert!(source.next_frame()?.is_some());
        }
        assert_eq!(source.stats().frames_captured, 3);
        Ok(())
    }
}
