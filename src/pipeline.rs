//! The playback loop: read, detect, annotate, present, repeat.
//!
//! A session runs frames strictly in sequence. The loop leaves the running
//! state on end-of-stream, on a read error, on a viewer quit, or on an
//! interrupt; inference errors on a frame abort the run instead of being
//! skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::annotate::{self, AnnotateOptions};
use crate::config::CrowdwatchConfig;
use crate::detect::{create_backend, LabelSet, PersonDetector};
use crate::display::{self, FrameSink, SinkEvent};
use crate::ingest::{FileConfig, FileSource};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LoopState {
    Running,
    Stopped,
}

/// Totals for a completed run.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub frames_processed: u64,
    /// Crowd count per frame, in playback order.
    pub counts: Vec<usize>,
    pub total_boxes: u64,
}

pub struct Session {
    source: FileSource,
    detector: PersonDetector,
    labels: LabelSet,
    sink: Box<dyn FrameSink>,
    annotate_opts: AnnotateOptions,
    stop: Arc<AtomicBool>,
}

impl Session {
    /// Build a full session from configuration.
    ///
    /// Every input is opened here, so an unreadable video, model, or label
    /// file fails the run before any inference happens.
    pub fn open(config: &CrowdwatchConfig, stop: Arc<AtomicBool>) -> Result<Self> {
        let source = FileSource::open(FileConfig {
            path: config.video_path.clone(),
        })
        .context("open video source")?;

        let labels = LabelSet::load(&config.detector.labels_path)?;
        let backend = create_backend(&config.detector)?;
        let detector = PersonDetector::new(
            backend,
            labels.person_index(),
            config.detector.score_threshold,
        );

        let sink = display::create_sink(
            config.display.headless,
            &config.display.window_title,
            config.display.wait_ms,
        )?;

        Ok(Self::with_parts(
            source,
            detector,
            labels,
            sink,
            AnnotateOptions {
                score_threshold: config.detector.score_threshold,
                nms_iou: config.detector.nms_iou,
            },
            stop,
        ))
    }

    /// Assemble a session from prebuilt parts.
    pub fn with_parts(
        source: FileSource,
        detector: PersonDetector,
        labels: LabelSet,
        sink: Box<dyn FrameSink>,
        annotate_opts: AnnotateOptions,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            detector,
            labels,
            sink,
            annotate_opts,
            stop,
        }
    }

    /// Run the playback loop to completion.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.detector.warm_up()?;
        log::info!(
            "pipeline: starting playback with the {} backend",
            self.detector.backend_name()
        );

        let total_frames = self.source.total_frames();
        let mut summary = RunSummary::default();
        let mut state = LoopState::Running;

        while state == LoopState::Running {
            if self.stop.load(Ordering::SeqCst) {
                log::info!("pipeline: interrupt received, stopping");
                break;
            }

            let mut frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("pipeline: end of stream");
                    state = LoopState::Stopped;
                    continue;
                }
                Err(err) => {
                    // A failed read ends playback the same way exhaustion does.
                    log::warn!("pipeline: frame read failed, stopping: {:#}", err);
                    state = LoopState::Stopped;
                    continue;
                }
            };

            let detections = self.detector.detect(&frame)?;
            let mut overlay =
                annotate::render(&mut frame, detections, &self.labels, &self.annotate_opts);
            overlay.build_hud(frame.width, frame.height, total_frames);

            summary.frames_processed += 1;
            summary.total_boxes += overlay.crowd_count as u64;
            summary.counts.push(overlay.crowd_count);

            if summary.frames_processed % 100 == 0 {
                log::debug!(
                    "pipeline: {} frames processed, last count {}",
                    summary.frames_processed,
                    overlay.crowd_count
                );
            }

            if self.sink.show(&frame, &overlay)? == SinkEvent::Quit {
                log::info!("pipeline: viewer requested quit");
                state = LoopState::Stopped;
            }
        }

        let stats = self.source.stats();
        log::info!(
            "pipeline: finished after {} frames from {} ({} boxes drawn)",
            summary.frames_processed,
            stats.path,
            summary.total_boxes
        );
        Ok(summary)
    }
}
