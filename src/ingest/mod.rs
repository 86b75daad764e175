//! Frame ingestion sources.
//!
//! Frames come from local video files only:
//! - FFmpeg-decoded files (feature: ingest-file-ffmpeg)
//! - Synthetic `stub://` sources (tests and demos)
//!
//! The ingest layer decodes in-memory, converts to packed RGB24, and stamps
//! each frame with a monotonically increasing index. A failed or exhausted
//! read is end-of-stream; sources never retry.

pub mod file;
#[cfg(feature = "ingest-file-ffmpeg")]
pub(crate) mod file_ffmpeg;

pub use file::{FileConfig, FileSource};
