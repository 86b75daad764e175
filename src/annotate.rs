//! Frame annotation: suppression, box drawing, and overlay text.
//!
//! Pixel edits happen here so the display layer only blits. Boxes are drawn
//! directly into the frame buffer; text (per-box labels and the heads-up
//! lines) is carried as overlay data because text rendering is owned by the
//! window backend.

use std::mem;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::detect::nms;
use crate::detect::{Detection, LabelSet};
use crate::frame::Frame;

/// Bounding boxes are drawn in pure green.
pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const BOX_BORDER_PX: i32 = 2;

/// Thresholds applied while annotating.
#[derive(Clone, Copy, Debug)]
pub struct AnnotateOptions {
    /// Minimum confidence for a box to enter suppression.
    pub score_threshold: f32,
    /// Maximum IoU between two surviving boxes.
    pub nms_iou: f32,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
            nms_iou: 0.4,
        }
    }
}

/// A surviving detection with its display label.
#[derive(Clone, Debug)]
pub struct LabelledBox {
    pub detection: Detection,
    pub label: String,
}

/// Everything the display layer needs beyond the frame pixels.
#[derive(Clone, Debug, Default)]
pub struct FrameOverlay {
    pub boxes: Vec<LabelledBox>,
    pub hud: Vec<String>,
    pub crowd_count: usize,
}

impl FrameOverlay {
    /// Build the heads-up lines for one frame.
    pub fn build_hud(&mut self, width: u32, height: u32, total_frames: Option<u64>) {
        self.hud.clear();
        self.hud.push(format!("People Count: {}", self.crowd_count));
        self.hud.push(format!("Frame Size: {} x {}", width, height));
        if let Some(total) = total_frames {
            self.hud.push(format!("Total Frames: {}", total));
        }
    }
}

/// Suppress overlapping detections, draw the survivors into the frame, and
/// return the overlay. The crowd count is the number of surviving boxes.
pub fn render(
    frame: &mut Frame,
    detections: Vec<Detection>,
    labels: &LabelSet,
    options: &AnnotateOptions,
) -> FrameOverlay {
    let kept = nms::suppress(detections, options.score_threshold, options.nms_iou);

    if !kept.is_empty() {
        draw_boxes(frame, &kept);
    }

    let boxes = kept
        .into_iter()
        .map(|detection| {
            let label = format!(
                "{} {:.2}",
                labels.name(detection.class_id),
                detection.confidence
            );
            LabelledBox { detection, label }
        })
        .collect::<Vec<_>>();

    let crowd_count = boxes.len();
    FrameOverlay {
        boxes,
        hud: Vec::new(),
        crowd_count,
    }
}

fn draw_boxes(frame: &mut Frame, detections: &[Detection]) {
    let width = frame.width;
    let height = frame.height;
    let data = mem::take(&mut frame.data);
    // Frame::new validated the buffer, so this reassembly cannot fail.
    let Some(mut image) = RgbImage::from_raw(width, height, data) else {
        return;
    };

    for detection in detections {
        for inset in 0..BOX_BORDER_PX {
            if let Some(rect) = clamped_rect(detection, inset, width, height) {
                draw_hollow_rect_mut(&mut image, rect, BOX_COLOR);
            }
        }
    }

    frame.data = image.into_raw();
}

/// Clamp one border ring of a detection to the frame. `None` when the ring
/// degenerates or lies fully outside the frame.
fn clamped_rect(detection: &Detection, inset: i32, width: u32, height: u32) -> Option<Rect> {
    let x0 = (detection.x + inset).max(0);
    let y0 = (detection.y + inset).max(0);
    let x1 = (detection.x + detection.w - inset).min(width as i32);
    let y1 = (detection.y + detection.h - inset).min(height as i32);
    let w = x1 - x0;
    let h = y1 - y0;
    if w <= 0 || h <= 0 || x0 >= width as i32 || y0 >= height as i32 {
        return None;
    }
    Some(Rect::at(x0, y0).of_size(w as u32, h as u32))
}
