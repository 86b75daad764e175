//! End-to-end playback over a synthetic source with a stub detector.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;

use crowdwatch::annotate::AnnotateOptions;
use crowdwatch::config::CrowdwatchConfig;
use crowdwatch::detect::{Candidate, DetectorBackend, LabelSet, PersonDetector, StubBackend};
use crowdwatch::display::HeadlessSink;
use crowdwatch::ingest::{FileConfig, FileSource};
use crowdwatch::Session;

/// Wraps a backend and counts how many times inference ran.
struct CountingBackend {
    inner: StubBackend,
    calls: Arc<AtomicUsize>,
}

impl DetectorBackend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.detect(pixels, width, height)
    }
}

fn labels() -> LabelSet {
    LabelSet::from_names(vec!["person".to_string(), "bicycle".to_string()]).unwrap()
}

fn synthetic_session(frames: u64, calls: Arc<AtomicUsize>) -> Session {
    let source = FileSource::open(FileConfig {
        path: format!("stub://hall?frames={}", frames),
    })
    .expect("synthetic source");
    let labels = labels();
    let backend = CountingBackend {
        inner: StubBackend::new(),
        calls,
    };
    let detector = PersonDetector::new(Box::new(backend), labels.person_index(), 0.5);
    Session::with_parts(
        source,
        detector,
        labels,
        Box::new(HeadlessSink::new()),
        AnnotateOptions::default(),
        Arc::new(AtomicBool::new(false)),
    )
}

#[test]
fn plays_every_frame_and_counts_one_person_per_frame() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut session = synthetic_session(3, calls.clone());
    let summary = session.run().expect("run");

    assert_eq!(summary.frames_processed, 3);
    assert_eq!(summary.counts, vec![1, 1, 1]);
    assert_eq!(summary.total_boxes, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn unreadable_video_fails_before_any_inference() {
    let mut config = CrowdwatchConfig::default();
    config.video_path = "/nonexistent/crowd_video3.mp4".to_string();
    config.detector.backend = "stub".to_string();
    config.display.headless = true;

    let err = Session::open(&config, Arc::new(AtomicBool::new(false)))
        .err()
        .expect("open should fail for a missing file");
    assert!(format!("{:#}", err).contains("could not open video file"));
}

#[test]
fn viewer_quit_stops_playback_early() {
    let source = FileSource::open(FileConfig {
        path: "stub://hall?frames=10".to_string(),
    })
    .expect("synthetic source");
    let labels = labels();
    let detector = PersonDetector::new(Box::new(StubBackend::new()), labels.person_index(), 0.5);
    let mut session = Session::with_parts(
        source,
        detector,
        labels,
        Box::new(HeadlessSink::quit_after(4)),
        AnnotateOptions::default(),
        Arc::new(AtomicBool::new(false)),
    );

    let summary = session.run().expect("run");
    assert_eq!(summary.frames_processed, 4);
}

#[test]
fn interrupt_flag_stops_before_first_frame() {
    let calls = Arc::new(AtomicUsize::new(0));
    let stop = Arc::new(AtomicBool::new(true));

    let source = FileSource::open(FileConfig {
        path: "stub://hall?frames=10".to_string(),
    })
    .expect("synthetic source");
    let labels = labels();
    let backend = CountingBackend {
        inner: StubBackend::new(),
        calls: calls.clone(),
    };
    let detector = PersonDetector::new(Box::new(backend), labels.person_index(), 0.5);
    let mut session = Session::with_parts(
        source,
        detector,
        labels,
        Box::new(HeadlessSink::new()),
        AnnotateOptions::default(),
        stop,
    );

    let summary = session.run().expect("run");
    assert_eq!(summary.frames_processed, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
