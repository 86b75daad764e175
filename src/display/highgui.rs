#![cfg(feature = "display-highgui")]

//! OpenCV window sink.
//!
//! Converts each annotated RGB frame to a BGR `Mat`, renders the per-box
//! labels and heads-up lines, and presents it in an autosized window. The
//! pacing delay doubles as the keyboard poll; `q` or ESC asks the playback
//! loop to stop.

use anyhow::{Context, Result};
use opencv::core::{self, Mat, Scalar, Vec3b};
use opencv::prelude::*;
use opencv::{highgui, imgproc};

use super::{FrameSink, SinkEvent};
use crate::annotate::FrameOverlay;
use crate::frame::Frame;

const KEY_ESC: i32 = 27;
const KEY_Q: i32 = 113;

fn green() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

fn red() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

fn white() -> Scalar {
    Scalar::new(255.0, 255.0, 255.0, 0.0)
}

pub struct HighguiWindow {
    title: String,
    wait_ms: i32,
}

impl HighguiWindow {
    pub fn open(title: &str, wait_ms: i32) -> Result<Self> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)
            .with_context(|| format!("failed to open display window '{}'", title))?;
        Ok(Self {
            title: title.to_string(),
            wait_ms: wait_ms.max(1),
        })
    }

    fn draw_text(&self, mat: &mut Mat, overlay: &FrameOverlay) -> Result<()> {
        for labelled in &overlay.boxes {
            let origin = core::Point::new(labelled.detection.x, labelled.detection.y + 20);
            imgproc::put_text(
                mat,
                &labelled.label,
                origin,
                imgproc::FONT_HERSHEY_PLAIN,
                2.0,
                green(),
                2,
                imgproc::LINE_8,
                false,
            )?;
        }

        // HUD lines: count in red, the rest in white.
        for (line_index, line) in overlay.hud.iter().enumerate() {
            let origin = core::Point::new(10, 50 + 50 * line_index as i32);
            let color = if line_index == 0 { red() } else { white() };
            imgproc::put_text(
                mat,
                line,
                origin,
                imgproc::FONT_HERSHEY_SIMPLEX,
                if line_index == 0 { 2.0 } else { 1.0 },
                color,
                if line_index == 0 { 3 } else { 2 },
                imgproc::LINE_8,
                false,
            )?;
        }
        Ok(())
    }
}

impl FrameSink for HighguiWindow {
    fn show(&mut self, frame: &Frame, overlay: &FrameOverlay) -> Result<SinkEvent> {
        let mut mat = rgb_frame_to_bgr_mat(frame)?;
        self.draw_text(&mut mat, overlay)?;
        highgui::imshow(&self.title, &mat).context("imshow failed")?;

        let key = highgui::wait_key(self.wait_ms).context("wait_key failed")?;
        if key == KEY_Q || key == KEY_ESC {
            log::info!("display: quit key pressed");
            return Ok(SinkEvent::Quit);
        }
        Ok(SinkEvent::Continue)
    }
}

impl Drop for HighguiWindow {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(&self.title);
    }
}

fn rgb_frame_to_bgr_mat(frame: &Frame) -> Result<Mat> {
    // One Vec3b per pixel; sized from the validated buffer, not the dims.
    let mut bgr = Vec::with_capacity(frame.pixels().len() / 3);
    for pixel in frame.pixels().chunks_exact(3) {
        bgr.push(Vec3b::from([pixel[2], pixel[1], pixel[0]]));
    }
    let flat = Mat::from_slice(&bgr).context("wrap frame pixels as Mat")?;
    let mat = flat
        .reshape(0, frame.height as i32)
        .context("reshape frame Mat")?
        .try_clone()
        .context("clone frame Mat")?;
    Ok(mat)
}
