//! crowdwatch - person counting over a local video file
//!
//! Opens the configured video, runs the person detector on every frame in
//! sequence, draws the surviving boxes plus a count overlay, and presents
//! frames until the file ends or the viewer quits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use crowdwatch::{CrowdwatchConfig, Session};

#[derive(Parser, Debug)]
#[command(name = "crowdwatch", version, about = "Person detection and counting")]
struct Args {
    /// Video file to play (overrides config and CROWDWATCH_VIDEO)
    #[arg(long)]
    video: Option<String>,
    /// Detector backend to use ("tract" or "stub")
    #[arg(long)]
    backend: Option<String>,
    /// ONNX model path
    #[arg(long)]
    model: Option<String>,
    /// Class label file path
    #[arg(long)]
    labels: Option<String>,
    /// Run without opening a display window
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = CrowdwatchConfig::load()?;
    if let Some(video) = args.video {
        config.video_path = video;
    }
    if let Some(backend) = args.backend {
        config.detector.backend = backend;
    }
    if let Some(model) = args.model {
        config.detector.model_path = model;
    }
    if let Some(labels) = args.labels {
        config.detector.labels_path = labels;
    }
    if args.headless {
        config.display.headless = true;
    }

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handle = stop.clone();
    ctrlc::set_handler(move || {
        stop_handle.store(true, Ordering::SeqCst);
    })
    .context("install interrupt handler")?;

    log::info!(
        "crowdwatch {} starting on {}",
        env!("CARGO_PKG_VERSION"),
        config.video_path
    );

    let mut session = Session::open(&config, stop)?;
    let summary = session.run()?;

    log::info!(
        "done: {} frames, {} people boxes total",
        summary.frames_processed,
        summary.total_boxes
    );
    Ok(())
}
