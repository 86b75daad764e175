#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::{imageops::FilterType, RgbImage};
use tract_ndarray::Axis;
use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Candidate;

/// Tract-based backend for ONNX person detection.
///
/// Loads a local YOLO-family model and performs inference on RGB frames.
/// Frames are resized to the network's square input, scaled to [0,1], and
/// fed as an NCHW f32 tensor. The output is decoded under a single
/// convention: the first output tensor holds candidate rows of
/// `[cx, cy, w, h, obj, score_0, score_1, ...]` with normalized
/// center/size coordinates and class scores starting at column 5.
pub struct TractBackend {
    model: TypedSimplePlan<TypedModel>,
    input_size: u32,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    /// Missing or malformed model files are fatal, with no fallback.
    pub fn new<P: AsRef<Path>>(model_path: P, input_size: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        if input_size == 0 {
            return Err(anyhow!("model input size must be > 0"));
        }
        let size = input_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, size, size)),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self { model, input_size })
    }

    fn build_input(&self, pixels: &[u8], width: u32, height: u32) -> Result<Tensor> {
        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                pixels.len()
            ));
        }

        let rgb = RgbImage::from_raw(width, height, pixels.to_vec())
            .ok_or_else(|| anyhow!("frame buffer does not match dimensions"))?;
        let resized = image::imageops::resize(
            &rgb,
            self.input_size,
            self.input_size,
            FilterType::Triangle,
        );

        let size = self.input_size as usize;
        let raw = resized.as_raw();
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, size, size),
            |(_, channel, y, x)| {
                let idx = (y * size + x) * 3 + channel;
                raw[idx] as f32 / 255.0
            },
        );
        Ok(input.into_tensor())
    }

    fn decode(&self, outputs: TVec<TValue>) -> Result<Vec<Candidate>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;

        let rows = match view.ndim() {
            3 if view.shape()[0] == 1 => view.index_axis(Axis(0), 0),
            2 => view,
            _ => {
                return Err(anyhow!(
                    "unexpected model output shape {:?}, want [1,N,R] or [N,R]",
                    view.shape()
                ))
            }
        };
        let rows = rows.into_dimensionality::<tract_ndarray::Ix2>()?;
        if rows.ncols() < 6 {
            return Err(anyhow!(
                "model output rows have {} columns, need at least 6",
                rows.ncols()
            ));
        }

        let mut candidates = Vec::new();
        for row in rows.outer_iter() {
            // Class scores start at column 5; column 4 (objectness) is not used.
            let mut class_id = 0usize;
            let mut score = 0f32;
            for (col, &s) in row.iter().enumerate().skip(5) {
                if s > score {
                    score = s;
                    class_id = col - 5;
                }
            }
            candidates.push(Candidate {
                cx: row[0],
                cy: row[1],
                w: row[2],
                h: row[3],
                class_id,
                score,
            });
        }
        Ok(candidates)
    }
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Candidate>> {
        let input = self.build_input(pixels, width, height)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        self.decode(outputs)
    }
}
