//! ripeness_detector - live ripe/unripe detection with MQTT status.
//!
//! This binary:
//! 1. Opens the configured camera (fatal if it cannot)
//! 2. Connects the MQTT publisher (unless publishing is disabled)
//! 3. Classifies every frame and shows the annotated result
//! 4. Publishes debounced status codes and a periodic keep-alive
//! 5. Stops on `q`, window close or Ctrl-C, releasing the camera

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ripeness_detector::config::{ConfigOverrides, CONFIG_ENV};
use ripeness_detector::display::Display;
use ripeness_detector::{
    pipeline, CameraSource, DetectorConfig, DisabledPublisher, FrameSource, HeadlessDisplay,
    MqttPublisher, Publisher, RunOptions,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Detect ripe and unripe fruit by color and report over MQTT"
)]
struct Args {
    /// Path to a TOML config file.
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Camera: device index, /dev/videoN, stub://name or an image path.
    #[arg(long)]
    camera: Option<String>,

    /// MQTT broker address (host[:port], mqtt:// or mqtts://).
    #[arg(long)]
    mqtt_broker_addr: Option<String>,

    /// MQTT topic for status messages.
    #[arg(long)]
    mqtt_topic: Option<String>,

    /// MQTT client identifier.
    #[arg(long)]
    mqtt_client_id: Option<String>,

    /// Run without publishing anything.
    #[arg(long)]
    no_publish: bool,

    /// Run without a window; stop with Ctrl-C.
    #[arg(long)]
    headless: bool,

    /// Stop after this many processed frames.
    #[arg(long)]
    max_frames: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = resolve_config(&args)?;
    log::info!(
        "camera={} publish={} broker={} topic={}",
        config.camera,
        config.mqtt.enabled,
        config.mqtt.broker_addr,
        config.mqtt.topic
    );

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })
        .context("error setting Ctrl-C handler")?;
    }

    let mut source = CameraSource::new(&config.camera)?;
    source
        .connect()
        .with_context(|| format!("could not open camera {}", config.camera))?;

    let mut publisher: Box<dyn Publisher> = if config.mqtt.enabled {
        Box::new(MqttPublisher::connect(&config.mqtt.settings()?)?)
    } else {
        log::warn!("MQTT publishing disabled");
        Box::new(DisabledPublisher)
    };

    let mut display = open_display(config.headless, stop);

    let options = RunOptions {
        health_interval: config.health_interval,
        max_frames: args.max_frames,
    };
    let result = pipeline::run(
        &mut source,
        display.as_mut(),
        publisher.as_mut(),
        &options,
    );
    publisher.close();

    let stats = result?;
    log::info!(
        "done: {} frames, {} messages sent, {} publish failures",
        stats.frames_processed,
        stats.messages_sent,
        stats.publish_failures
    );
    Ok(())
}

fn resolve_config(args: &Args) -> Result<DetectorConfig> {
    let mut config = DetectorConfig::load_from(args.config.as_deref())?;
    config.apply_overrides(&ConfigOverrides {
        camera: args.camera.clone(),
        mqtt_broker_addr: args.mqtt_broker_addr.clone(),
        mqtt_topic: args.mqtt_topic.clone(),
        mqtt_client_id: args.mqtt_client_id.clone(),
        no_publish: args.no_publish,
        headless: args.headless,
    });
    config.validate()?;
    Ok(config)
}

#[cfg(feature = "display-minifb")]
fn open_display(headless: bool, stop: Arc<AtomicBool>) -> Box<dyn Display> {
    if headless {
        Box::new(HeadlessDisplay::new(stop))
    } else {
        Box::new(ripeness_detector::MinifbDisplay::new(stop))
    }
}

#[cfg(not(feature = "display-minifb"))]
fn open_display(headless: bool, stop: Arc<AtomicBool>) -> Box<dyn Display> {
    if !headless {
        log::warn!("built without display-minifb; running headless (Ctrl-C to stop)");
    }
    Box::new(HeadlessDisplay::new(stop))
}
