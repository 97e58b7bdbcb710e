//! classify_still - run the classifier once over an image file.
//!
//! Prints the detections as JSON on stdout and optionally writes the
//! annotated image. Handy for checking thresholds against captured photos.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use ripeness_detector::ingest::still::load_frame;
use ripeness_detector::{classify, overlay, Detections};

#[derive(Parser, Debug)]
#[command(author, version, about = "Classify a still image by color")]
struct Args {
    /// Image to classify (png or jpeg).
    image: String,
    /// Write the annotated image here.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    image: &'a str,
    width: u32,
    height: u32,
    title: String,
    detections: &'a Detections,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let frame = load_frame(&args.image)?;
    let detections = classify(&frame);

    if let Some(path) = &args.output {
        overlay::annotate(&frame, &detections)
            .into_image()
            .save(path)
            .with_context(|| format!("write annotated image {}", path.display()))?;
        log::info!("annotated image written to {}", path.display());
    }

    let report = Report {
        image: &args.image,
        width: frame.width(),
        height: frame.height(),
        title: overlay::title(&detections),
        detections: &detections,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
