//! Person filtering over raw backend candidates.

use anyhow::Result;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;
use crate::frame::Frame;

/// Runs a backend and keeps only confident person candidates.
///
/// A candidate survives when its best class is the person index and its
/// score strictly exceeds the score threshold. Survivors are converted to
/// pixel-space boxes in network iteration order.
pub struct PersonDetector {
    backend: Box<dyn DetectorBackend>,
    person_class: usize,
    score_threshold: f32,
}

impl PersonDetector {
    pub fn new(
        backend: Box<dyn DetectorBackend>,
        person_class: usize,
        score_threshold: f32,
    ) -> Self {
        Self {
            backend,
            person_class,
            score_threshold,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn warm_up(&mut self) -> Result<()> {
        self.backend.warm_up()
    }

    /// Infer on one frame and return filtered person detections.
    pub fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        let candidates = self
            .backend
            .detect(frame.pixels(), frame.width, frame.height)?;
        Ok(candidates
            .iter()
            .filter(|c| c.class_id == self.person_class && c.score > self.score_threshold)
            .map(|c| c.to_detection(frame))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::result::Candidate;

    /// Test backend replaying a fixed candidate list every frame.
    struct FixedBackend {
        candidates: Vec<Candidate>,
    }

    impl DetectorBackend for FixedBackend {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn detect(&mut self, _: &[u8], _: u32, _: u32) -> Result<Vec<Candidate>> {
            Ok(self.candidates.clone())
        }
    }

    fn cand(class_id: usize, score: f32) -> Candidate {
        Candidate {
            cx: 0.5,
            cy: 0.5,
            w: 0.2,
            h: 0.4,
            class_id,
            score,
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![0u8; 64 * 48 * 3], 64, 48, 0).unwrap()
    }

    #[test]
    fn keeps_only_confident_persons() {
        let backend = FixedBackend {
            candidates: vec![
                cand(0, 0.9),  // person, confident
                cand(0, 0.4),  // person, below threshold
                cand(2, 0.95), // car, confident
            ],
        };
        let mut detector = PersonDetector::new(Box::new(backend), 0, 0.5);
        let detections = detector.detect(&frame()).unwrap();
        assert_eq!(detections.len(), 1);
        assert!((detections[0].confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn threshold_is_strict() {
        let backend = FixedBackend {
            candidates: vec![cand(0, 0.5)],
        };
        let mut detector = PersonDetector::new(Box::new(backend), 0, 0.5);
        assert!(detector.detect(&frame()).unwrap().is_empty());
    }

    #[test]
    fn respects_non_zero_person_index() {
        let backend = FixedBackend {
            candidates: vec![cand(0, 0.9), cand(3, 0.8)],
        };
        let mut detector = PersonDetector::new(Box::new(backend), 3, 0.5);
        let detections = detector.detect(&frame()).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class_id, 3);
    }
}
