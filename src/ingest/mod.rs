//! Frame ingestion sources.
//!
//! This module provides the sources the detector loop reads from:
//! - Synthetic scene (`stub://...`) for demos and tests
//! - Still image file (`file://...` or a path ending in an image extension)
//! - USB/V4L2 devices selected by index (feature: ingest-v4l2)
//!
//! A source returns `Ok(None)` when no frame is available for this tick. That
//! is a transient condition: the caller skips the tick and tries again.

mod normalize;
pub mod still;
pub mod synthetic;
#[cfg(feature = "ingest-v4l2")]
pub mod v4l2;

use anyhow::{anyhow, Result};

use crate::frame::Frame;

pub use still::StillImageSource;
pub use synthetic::SyntheticSource;
#[cfg(feature = "ingest-v4l2")]
pub use v4l2::{V4l2Config, V4l2Source};

pub const DEFAULT_CAMERA: &str = "0";

/// Seam between the detector loop and whatever produces frames.
pub trait FrameSource {
    /// Open the underlying device. Failure here is fatal at startup.
    fn connect(&mut self) -> Result<()>;

    /// Next frame, or `None` if nothing was captured this tick.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Release the device. Called once on shutdown.
    fn release(&mut self) {}

    fn is_healthy(&self) -> bool {
        true
    }

    fn stats(&self) -> SourceStats;
}

/// Statistics for a frame source.
#[derive(Clone, Debug, Default)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub source: String,
}

/// Where frames come from, parsed from a camera string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CameraSpec {
    Synthetic(String),
    Still(String),
    Device(String),
}

impl CameraSpec {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(anyhow!("camera source must not be empty"));
        }
        if value.starts_with("stub://") {
            return Ok(CameraSpec::Synthetic(value.to_string()));
        }
        if let Some(path) = value.strip_prefix("file://") {
            return Ok(CameraSpec::Still(path.to_string()));
        }
        if let Ok(index) = value.parse::<u32>() {
            return Ok(CameraSpec::Device(format!("/dev/video{}", index)));
        }
        if value.starts_with("/dev/video") {
            return Ok(CameraSpec::Device(value.to_string()));
        }
        if has_image_extension(value) {
            return Ok(CameraSpec::Still(value.to_string()));
        }
        Err(anyhow!(
            "unsupported camera source {} (use an index, /dev/videoN, stub://name or an image path)",
            value
        ))
    }
}

fn has_image_extension(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    [".png", ".jpg", ".jpeg"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Frame source selected from a camera string.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticSource),
    Still(StillImageSource),
    #[cfg(feature = "ingest-v4l2")]
    Device(V4l2Source),
}

impl CameraSource {
    pub fn new(camera: &str) -> Result<Self> {
        let backend = match CameraSpec::parse(camera)? {
            CameraSpec::Synthetic(name) => CameraBackend::Synthetic(SyntheticSource::new(name)),
            CameraSpec::Still(path) => CameraBackend::Still(StillImageSource::new(path)),
            CameraSpec::Device(device) => Self::device_backend(device)?,
        };
        Ok(Self { backend })
    }

    #[cfg(feature = "ingest-v4l2")]
    fn device_backend(device: String) -> Result<CameraBackend> {
        let config = V4l2Config {
            device,
            ..V4l2Config::default()
        };
        Ok(CameraBackend::Device(V4l2Source::new(config)))
    }

    #[cfg(not(feature = "ingest-v4l2"))]
    fn device_backend(device: String) -> Result<CameraBackend> {
        Err(anyhow!(
            "camera device {} requires the ingest-v4l2 feature",
            device
        ))
    }

    fn inner(&self) -> &dyn FrameSource {
        match &self.backend {
            CameraBackend::Synthetic(source) => source,
            CameraBackend::Still(source) => source,
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn FrameSource {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source,
            CameraBackend::Still(source) => source,
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source,
        }
    }
}

impl FrameSource for CameraSource {
    fn connect(&mut self) -> Result<()> {
        self.inner_mut().connect()
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        self.inner_mut().next_frame()
    }

    fn release(&mut self) {
        self.inner_mut().release()
    }

    fn is_healthy(&self) -> bool {
        self.inner().is_healthy()
    }

    fn stats(&self) -> SourceStats {
        self.inner().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_spec_parsing() {
        assert_eq!(
            CameraSpec::parse("0").unwrap(),
            CameraSpec::Device("/dev/video0".to_string())
        );
        assert_eq!(
            CameraSpec::parse("/dev/video2").unwrap(),
            CameraSpec::Device("/dev/video2".to_string())
        );
        assert_eq!(
            CameraSpec::parse("stub://bench").unwrap(),
            CameraSpec::Synthetic("stub://bench".to_string())
        );
        assert_eq!(
            CameraSpec::parse("file:///tmp/a.bin").unwrap(),
            CameraSpec::Still("/tmp/a.bin".to_string())
        );
        assert_eq!(
            CameraSpec::parse("shots/berry.JPG").unwrap(),
            CameraSpec::Still("shots/berry.JPG".to_string())
        );
        assert!(CameraSpec::parse("").is_err());
        assert!(CameraSpec::parse("rtsp://cam").is_err());
    }

    #[test]
    fn stub_camera_connects_and_produces_frames() -> Result<()> {
        let mut source = CameraSource::new("stub://test")?;
        source.connect()?;
        let frame = source.next_frame()?.expect("frame");
        assert!(!frame.is_empty());
        assert_eq!(source.stats().frames_captured, 1);
        Ok(())
    }

    #[cfg(not(feature = "ingest-v4l2"))]
    #[test]
    fn device_requires_feature() {
        let err = CameraSource::new("0").err().expect("error");
        assert!(err.to_string().contains("ingest-v4l2"));
    }
}
