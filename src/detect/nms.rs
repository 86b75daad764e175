//! Greedy non-max suppression.
//!
//! Collapses overlapping boxes for the same object: boxes below the score
//! threshold are dropped first, the rest are visited in descending
//! confidence order, and a box is suppressed when its IoU with an already
//! kept box exceeds the IoU threshold.

use std::cmp::Ordering;

use crate::detect::result::Detection;

/// Run NMS over `detections`, returning the surviving boxes.
///
/// Survivors keep their relative confidence ordering (highest first).
pub fn suppress(
    detections: Vec<Detection>,
    score_threshold: f32,
    iou_threshold: f32,
) -> Vec<Detection> {
    let mut boxes: Vec<Detection> = detections
        .into_iter()
        .filter(|d| d.confidence >= score_threshold)
        .collect();
    if boxes.is_empty() {
        return boxes;
    }

    boxes.sort_unstable_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in boxes {
        if kept
            .iter()
            .all(|survivor| candidate.iou(survivor) <= iou_threshold)
        {
            kept.push(candidate);
        }
    }
    kept
}
