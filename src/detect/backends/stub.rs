use anyhow::Result;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Candidate;

/// Stub backend for tests and demos.
///
/// Emits one deterministic person-shaped candidate per frame, centered in
/// the frame, so the full filter/suppress/annotate path can run without a
/// model file.
pub struct StubBackend {
    class_id: usize,
    score: f32,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            class_id: 0,
            score: 0.9,
        }
    }

    /// Override the emitted class index.
    pub fn with_class(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    /// Override the emitted confidence.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<Vec<Candidate>> {
        Ok(vec![Candidate {
            cx: 0.5,
            cy: 0.5,
            w: 0.25,
            h: 0.6,
            class_id: self.class_id,
            score: self.score,
        }])
    }
}
