use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};

use ripeness_detector::display::Display;
use ripeness_detector::{
    pipeline, CameraSource, Frame, FrameSource, HeadlessDisplay, OutboundMessage, Publisher,
    RunOptions, SourceStats,
};

const CRIMSON: [u8; 3] = [220, 20, 60];
const LEAF_GREEN: [u8; 3] = [30, 180, 40];

enum Step {
    Frame(Frame),
    Nothing,
    Fail,
}

/// Replays a fixed script, then raises the stop flag.
struct ScriptedSource {
    steps: VecDeque<Step>,
    stop: Arc<AtomicBool>,
    captured: u64,
    released: Arc<AtomicBool>,
    stats_calls: Arc<AtomicU64>,
}

impl ScriptedSource {
    fn new(steps: Vec<Step>, stop: Arc<AtomicBool>) -> Self {
        Self {
            steps: steps.into(),
            stop,
            captured: 0,
            released: Arc::new(AtomicBool::new(false)),
            stats_calls: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let step = self.steps.pop_front();
        if self.steps.is_empty() {
            self.stop.store(true, Ordering::SeqCst);
        }
        match step {
            Some(Step::Frame(frame)) => {
                self.captured += 1;
                Ok(Some(frame))
            }
            Some(Step::Nothing) | None => Ok(None),
            Some(Step::Fail) => Err(anyhow!("device hiccup")),
        }
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }

    fn is_healthy(&self) -> bool {
        self.captured > 0
    }

    fn stats(&self) -> SourceStats {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        SourceStats {
            frames_captured: self.captured,
            source: "scripted".to_string(),
        }
    }
}

#[derive(Default)]
struct RecordingPublisher {
    payloads: Vec<String>,
}

impl Publisher for RecordingPublisher {
    fn publish(&mut self, message: &OutboundMessage) -> Result<()> {
        self.payloads.push(message.payload());
        Ok(())
    }
}

struct BrokenPublisher {
    attempts: u32,
}

impl Publisher for BrokenPublisher {
    fn publish(&mut self, _message: &OutboundMessage) -> Result<()> {
        self.attempts += 1;
        Err(anyhow!("broker unreachable"))
    }
}

/// Headless display that also remembers every title it was given.
struct TitleLog {
    inner: HeadlessDisplay,
    titles: Vec<String>,
}

impl Display for TitleLog {
    fn show(&mut self, frame: &Frame, title: &str) -> Result<()> {
        self.titles.push(title.to_string());
        self.inner.show(frame, title)
    }

    fn quit_requested(&mut self) -> bool {
        self.inner.quit_requested()
    }
}

fn scene(red: bool, green: bool) -> Frame {
    let mut frame = Frame::filled(160, 120, [10, 10, 10]);
    if red {
        frame.fill_rect(20, 20, 30, 30, CRIMSON);
    }
    if green {
        frame.fill_rect(100, 60, 30, 30, LEAF_GREEN);
    }
    frame
}

#[test]
fn loop_reports_each_class_once_and_skips_bad_ticks() -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    let mut source = ScriptedSource::new(
        vec![
            Step::Frame(scene(true, false)),
            Step::Nothing,
            Step::Frame(scene(true, false)),
            Step::Fail,
            Step::Frame(Frame::filled(0, 0, [0, 0, 0])),
            Step::Frame(scene(true, true)),
            Step::Frame(scene(false, false)),
        ],
        stop.clone(),
    );
    let released = source.released.clone();
    let mut display = TitleLog {
        inner: HeadlessDisplay::new(stop),
        titles: Vec::new(),
    };
    let mut publisher = RecordingPublisher::default();

    let stats = pipeline::run(
        &mut source,
        &mut display,
        &mut publisher,
        &RunOptions::default(),
    )?;

    assert_eq!(publisher.payloads, vec!["1".to_string(), "0".to_string()]);
    assert_eq!(stats.frames_processed, 4);
    assert_eq!(stats.frames_skipped, 3);
    assert_eq!(stats.messages_sent, 2);
    assert_eq!(stats.publish_failures, 0);
    assert!(released.load(Ordering::SeqCst));

    assert_eq!(display.titles.len(), 4);
    assert!(display.titles[0].contains("Ripe Strawberry"));
    assert!(display.titles[2].contains("Unripe Strawberry"));
    assert_eq!(display.titles[3], "Ripe Strawberry Detection");
    Ok(())
}

#[test]
fn publish_failures_do_not_stop_the_loop() -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    let mut source = ScriptedSource::new(
        vec![
            Step::Frame(scene(true, true)),
            Step::Frame(scene(true, true)),
            Step::Frame(scene(false, false)),
        ],
        stop.clone(),
    );
    let mut display = HeadlessDisplay::new(stop);
    let mut publisher = BrokenPublisher { attempts: 0 };

    let stats = pipeline::run(
        &mut source,
        &mut display,
        &mut publisher,
        &RunOptions::default(),
    )?;

    assert_eq!(stats.frames_processed, 3);
    assert_eq!(stats.messages_sent, 0);
    assert_eq!(stats.publish_failures, 2);
    assert_eq!(publisher.attempts, 2);
    Ok(())
}

#[test]
fn synthetic_camera_runs_for_max_frames() -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    let mut source = CameraSource::new("stub://bench")?;
    source.connect()?;
    let mut display = HeadlessDisplay::new(stop);
    let mut publisher = RecordingPublisher::default();
    let options = RunOptions {
        max_frames: Some(5),
        ..RunOptions::default()
    };

    let stats = pipeline::run(&mut source, &mut display, &mut publisher, &options)?;

    assert_eq!(stats.frames_processed, 5);
    assert_eq!(source.stats().frames_captured, 5);
    assert_eq!(publisher.payloads, vec!["1".to_string()]);
    Ok(())
}

#[test]
fn health_is_reported_while_capture_keeps_failing() -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    let mut source = ScriptedSource::new((0..20).map(|_| Step::Fail).collect(), stop.clone());
    let stats_calls = source.stats_calls.clone();
    let mut display = HeadlessDisplay::new(stop);
    let mut publisher = RecordingPublisher::default();
    let options = RunOptions {
        health_interval: Duration::from_millis(1),
        ..RunOptions::default()
    };

    let stats = pipeline::run(&mut source, &mut display, &mut publisher, &options)?;

    assert_eq!(stats.frames_processed, 0);
    assert_eq!(stats.frames_skipped, 20);
    assert!(publisher.payloads.is_empty());
    // every skipped tick sleeps past the 1 ms interval
    assert!(stats_calls.load(Ordering::SeqCst) >= 19);
    Ok(())
}
