//! Per-frame pipeline and the detector loop.
//!
//! `Pipeline::tick` is the whole per-frame decision: classify, notify and
//! render, with no I/O. `run` drives it: acquire a frame, tick, publish,
//! show, check for quit.

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::classify::{classify, Detections};
use crate::display::{Display, KEY_POLL};
use crate::frame::Frame;
use crate::ingest::FrameSource;
use crate::notify::{self, NotifierState, OutboundMessage};
use crate::overlay;
use crate::transport::Publisher;

pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(5);

/// Everything one frame produced.
#[derive(Clone, Debug)]
pub struct TickOutput {
    pub annotated: Frame,
    pub title: String,
    pub detections: Detections,
    pub messages: Vec<OutboundMessage>,
}

pub struct Pipeline {
    state: NotifierState,
}

impl Pipeline {
    pub fn new(started_at: Instant) -> Self {
        Self::with_state(NotifierState::new(started_at))
    }

    pub fn with_state(state: NotifierState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &NotifierState {
        &self.state
    }

    pub fn tick(&mut self, frame: &Frame, now: Instant) -> TickOutput {
        let detections = classify(frame);
        let messages = notify::tick(now, &detections, &mut self.state);
        TickOutput {
            annotated: overlay::annotate(frame, &detections),
            title: overlay::title(&detections),
            detections,
            messages,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub health_interval: Duration,
    /// Stop after this many processed frames (used by tests and benchmarks).
    pub max_frames: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            health_interval: DEFAULT_HEALTH_INTERVAL,
            max_frames: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub messages_sent: u64,
    pub publish_failures: u64,
}

/// Run the detector loop until the display reports a quit request.
///
/// The camera is released and the display closed before returning. Capture
/// errors, empty frames and publish failures are logged and the loop goes on.
pub fn run(
    source: &mut dyn FrameSource,
    display: &mut dyn Display,
    publisher: &mut dyn Publisher,
    options: &RunOptions,
) -> Result<RunStats> {
    let mut pipeline = Pipeline::new(Instant::now());
    let mut stats = RunStats::default();
    let mut last_health_log = Instant::now();

    log::info!("detector loop running");

    let result = loop {
        if display.quit_requested() {
            log::info!("quit requested");
            break Ok(());
        }
        if options
            .max_frames
            .is_some_and(|max| stats.frames_processed >= max)
        {
            break Ok(());
        }

        // logged even while every capture fails
        if last_health_log.elapsed() >= options.health_interval {
            let source_stats = source.stats();
            log::info!(
                "source={} health={} captured={} processed={} skipped={} sent={} publish_failures={}",
                source_stats.source,
                source.is_healthy(),
                source_stats.frames_captured,
                stats.frames_processed,
                stats.frames_skipped,
                stats.messages_sent,
                stats.publish_failures
            );
            last_health_log = Instant::now();
        }

        let frame = match source.next_frame() {
            Ok(Some(frame)) if !frame.is_empty() => frame,
            Ok(_) => {
                stats.frames_skipped += 1;
                log::debug!("no frame this tick");
                std::thread::sleep(KEY_POLL);
                continue;
            }
            Err(e) => {
                stats.frames_skipped += 1;
                log::warn!("frame capture failed: {:#}", e);
                std::thread::sleep(KEY_POLL);
                continue;
            }
        };

        let output = pipeline.tick(&frame, Instant::now());
        stats.frames_processed += 1;

        for message in &output.messages {
            match publisher.publish(message) {
                Ok(()) => {
                    stats.messages_sent += 1;
                    log::debug!("published {}", message);
                }
                Err(e) => {
                    stats.publish_failures += 1;
                    log::warn!("publish failed: {:#}", e);
                }
            }
        }

        if let Err(e) = display.show(&output.annotated, &output.title) {
            break Err(e);
        }
    };

    source.release();
    display.close();
    log::info!(
        "detector loop stopped after {} frames ({} skipped, {} messages sent)",
        stats.frames_processed,
        stats.frames_skipped,
        stats.messages_sent
    );
    result.map(|()| stats)
}
