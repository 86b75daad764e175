//! Frame presentation.
//!
//! The pipeline talks to a `FrameSink`. The highgui sink (feature:
//! display-highgui) opens a real window and handles quit keys; the headless
//! sink swallows frames so the pipeline can run in tests and on machines
//! without a display server.

use anyhow::Result;

#[cfg(feature = "display-highgui")]
mod highgui;

#[cfg(feature = "display-highgui")]
pub use highgui::HighguiWindow;

use crate::annotate::FrameOverlay;
use crate::frame::Frame;

/// What the sink wants the playback loop to do after a frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SinkEvent {
    Continue,
    /// The viewer asked to quit (window key or sink policy).
    Quit,
}

pub trait FrameSink {
    fn show(&mut self, frame: &Frame, overlay: &FrameOverlay) -> Result<SinkEvent>;
}

/// Sink that counts frames without presenting them.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    frames_shown: u64,
    quit_after: Option<u64>,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a quit after N frames, mimicking a viewer keypress.
    pub fn quit_after(frames: u64) -> Self {
        Self {
            frames_shown: 0,
            quit_after: Some(frames),
        }
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }
}

impl FrameSink for HeadlessSink {
    fn show(&mut self, _frame: &Frame, overlay: &FrameOverlay) -> Result<SinkEvent> {
        self.frames_shown += 1;
        log::debug!(
            "headless sink: frame {} with {} boxes",
            self.frames_shown,
            overlay.boxes.len()
        );
        match self.quit_after {
            Some(limit) if self.frames_shown >= limit => Ok(SinkEvent::Quit),
            _ => Ok(SinkEvent::Continue),
        }
    }
}

/// Build the configured sink.
///
/// Without the display-highgui feature a windowed request degrades to the
/// headless sink with a warning rather than failing the run.
pub fn create_sink(headless: bool, title: &str, wait_ms: i32) -> Result<Box<dyn FrameSink>> {
    if headless {
        return Ok(Box::new(HeadlessSink::new()));
    }
    #[cfg(feature = "display-highgui")]
    {
        Ok(Box::new(HighguiWindow::open(title, wait_ms)?))
    }
    #[cfg(not(feature = "display-highgui"))]
    {
        let _ = (title, wait_ms);
        log::warn!("display-highgui feature is disabled; running headless");
        Ok(Box::new(HeadlessSink::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(vec![0u8; 8 * 8 * 3], 8, 8, 0).unwrap()
    }

    #[test]
    fn headless_sink_counts_frames() {
        let mut sink = HeadlessSink::new();
        for _ in 0..5 {
            assert_eq!(
                sink.show(&frame(), &FrameOverlay::default()).unwrap(),
                SinkEvent::Continue
            );
        }
        assert_eq!(sink.frames_shown(), 5);
    }

    #[test]
    fn quit_after_emits_quit_on_nth_frame() {
        let mut sink = HeadlessSink::quit_after(2);
        assert_eq!(
            sink.show(&frame(), &FrameOverlay::default()).unwrap(),
            SinkEvent::Continue
        );
        assert_eq!(
            sink.show(&frame(), &FrameOverlay::default()).unwrap(),
            SinkEvent::Quit
        );
    }
}
