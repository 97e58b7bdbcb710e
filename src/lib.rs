//! Ripeness detector
//!
//! Watches a camera feed for ripe (red) and unripe (green) fruit using fixed
//! HSV thresholds, draws boxes around what it finds and reports status over
//! MQTT.
//!
//! # Architecture
//!
//! Each frame goes through one pass:
//!
//! 1. **Classify**: HSV threshold per color class, dilate, trace contours,
//!    keep regions with area above 300 px.
//! 2. **Notify**: emit `KeepAlive` every 30 s and a class code (`1` ripe,
//!    `0` unripe) at most once per 30 s while that class is in view.
//! 3. **Render**: draw bounding boxes on a copy of the frame for display.
//!
//! The per-frame work is pure (`pipeline::Pipeline::tick`); camera, window
//! and broker sit behind the `FrameSource`, `display::Display` and
//! `Publisher` traits.
//!
//! # Module Structure
//!
//! - `color`: color classes and the threshold table
//! - `classify`: HSV mask, dilation, contour tracing
//! - `notify`: debounce and keep-alive state machine
//! - `pipeline`: per-frame tick and the detector loop
//! - `ingest`: frame sources (synthetic, still image, V4L2)
//! - `display`: window output and quit control
//! - `transport`: MQTT publisher
//! - `config`: deployment settings

pub mod classify;
pub mod color;
pub mod config;
pub mod display;
pub mod frame;
pub mod ingest;
pub mod notify;
pub mod overlay;
pub mod pipeline;
pub mod transport;

pub use classify::{classify, BoundingBox, DetectedRegion, Detections};
pub use color::{ColorClass, ColorClassSpec, Hsv, HsvRange, CLASS_TABLE};
pub use config::{ConfigOverrides, DetectorConfig, MqttConfig};
pub use display::HeadlessDisplay;
#[cfg(feature = "display-minifb")]
pub use display::MinifbDisplay;
pub use frame::Frame;
pub use ingest::{CameraSource, CameraSpec, FrameSource, SourceStats};
pub use notify::{NotifierState, NotifyPhase, OutboundMessage};
pub use pipeline::{Pipeline, RunOptions, RunStats, TickOutput};
pub use transport::{DisabledPublisher, MqttPublisher, MqttSettings, Publisher};
