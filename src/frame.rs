//! Owned video frames.
//!
//! A `Frame` is a packed RGB24 pixel buffer plus its dimensions and a
//! monotonically increasing index assigned by the ingest layer. The playback
//! loop owns exactly one frame per iteration; annotation mutates it in place
//! and the frame is dropped when the next one is read.

use anyhow::{anyhow, Result};

/// Bytes per RGB24 pixel.
pub const BYTES_PER_PIXEL: usize = 3;

/// One decoded video frame in packed RGB24 layout.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Packed RGB pixel data, `width * height * 3` bytes, row-major.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Zero-based position of this frame in the stream.
    pub index: u64,
}

impl Frame {
    /// Create a frame, validating that the buffer matches the dimensions.
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: u64) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if data.len() != expected {
            return Err(anyhow!(
                "expected {} RGB bytes for {}x{}, received {}",
                expected,
                width,
                height,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            index,
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }
}
