use crate::frame::Frame;

/// One raw network output row after class argmax.
///
/// Coordinates are a normalized center/size box in [0,1] relative to the
/// original frame. Candidates exist only between inference and filtering.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    /// Index of the highest-scoring class for this row.
    pub class_id: usize,
    /// Score of that class, in [0,1].
    pub score: f32,
}

/// A pixel-space detection that passed person/score filtering.
///
/// Top-left/width/height in pixels of the original frame. The box is the
/// direct conversion of the network's normalized center/size output, so it
/// may extend past the frame edges; drawing clamps, the data does not.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub class_id: usize,
    pub confidence: f32,
}

impl Detection {
    /// Intersection over union with another box.
    pub fn iou(&self, other: &Detection) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.w).min(other.x + other.w);
        let y2 = (self.y + self.h).min(other.y + other.h);

        let inter = ((x2 - x1).max(0) as f32) * ((y2 - y1).max(0) as f32);
        if inter <= 0.0 {
            return 0.0;
        }
        let area_a = (self.w.max(0) as f32) * (self.h.max(0) as f32);
        let area_b = (other.w.max(0) as f32) * (other.h.max(0) as f32);
        let union = area_a + area_b - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

impl Candidate {
    /// Convert the normalized center/size box to pixel-space top-left/width/height.
    pub fn to_detection(&self, frame: &Frame) -> Detection {
        let fw = frame.width as f32;
        let fh = frame.height as f32;
        let center_x = (self.cx * fw) as i32;
        let center_y = (self.cy * fh) as i32;
        let w = (self.w * fw) as i32;
        let h = (self.h * fh) as i32;
        Detection {
            x: center_x - w / 2,
            y: center_y - h / 2,
            w,
            h,
            class_id: self.class_id,
            confidence: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x: i32, y: i32, w: i32, h: i32) -> Detection {
        Detection {
            x,
            y,
            w,
            h,
            class_id: 0,
            confidence: 1.0,
        }
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = det(10, 10, 20, 40);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = det(0, 0, 10, 10);
        let b = det(100, 100, 10, 10);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_half_overlap() {
        // Two 10x10 boxes sharing a 5x10 strip: inter 50, union 150.
        let a = det(0, 0, 10, 10);
        let b = det(5, 0, 10, 10);
        assert!((a.iou(&b) - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn candidate_converts_to_pixel_space() {
        let frame = Frame::new(vec![0u8; 100 * 50 * 3], 100, 50, 0).unwrap();
        let cand = Candidate {
            cx: 0.5,
            cy: 0.5,
            w: 0.2,
            h: 0.4,
            class_id: 0,
            score: 0.9,
        };
        let d = cand.to_detection(&frame);
        assert_eq!((d.x, d.y, d.w, d.h), (40, 15, 20, 20));
        assert_eq!(d.class_id, 0);
        assert!((d.confidence - 0.9).abs() < 1e-6);
    }
}
