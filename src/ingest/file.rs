//! Local file frame source.
//!
//! `FileSource` reads frames from a local video file. `stub://` paths select
//! a synthetic in-memory source; everything else opens a real file through
//! the FFmpeg backend when the `ingest-file-ffmpeg` feature is enabled.
//!
//! `next_frame` yields `Ok(None)` at end-of-stream. Read errors are real
//! errors; the playback loop treats both as termination and never retries.

use std::path::Path;

use anyhow::{anyhow, Result};

#[cfg(feature = "ingest-file-ffmpeg")]
use super::file_ffmpeg::FfmpegFileSource;
use crate::frame::Frame;

const SYNTHETIC_WIDTH: u32 = 640;
const SYNTHETIC_HEIGHT: u32 = 480;
const SYNTHETIC_DEFAULT_FRAMES: u64 = 30;

/// Configuration for a local file source.
#[derive(Clone, Debug, Default)]
pub struct FileConfig {
    /// Local file path (e.g., "crowd_video3.mp4") or a `stub://` URI.
    pub path: String,
}

/// Local file frame source.
pub struct FileSource {
    backend: FileBackend,
}

enum FileBackend {
    Synthetic(SyntheticFileSource),
    #[cfg(feature = "ingest-file-ffmpeg")]
    Ffmpeg(FfmpegFileSource),
}

impl FileSource {
    /// Open a source. Fatal if the path is not a readable local video file.
    pub fn open(config: FileConfig) -> Result<Self> {
        if !is_local_file_path(&config.path) {
            return Err(anyhow!(
                "file ingestion only supports local paths (no URL schemes)"
            ));
        }
        if config.path.starts_with("stub://") {
            let source = SyntheticFileSource::new(&config.path)?;
            log::info!("FileSource: opened {} (synthetic)", config.path);
            return Ok(Self {
                backend: FileBackend::Synthetic(source),
            });
        }
        if !Path::new(&config.path).is_file() {
            return Err(anyhow!("could not open video file {}", config.path));
        }
        #[cfg(feature = "ingest-file-ffmpeg")]
        {
            let source = FfmpegFileSource::new(&config.path)?;
            log::info!("FileSource: opened {} (ffmpeg)", config.path);
            Ok(Self {
                backend: FileBackend::Ffmpeg(source),
            })
        }
        #[cfg(not(feature = "ingest-file-ffmpeg"))]
        {
            Err(anyhow!(
                "file ingestion requires the ingest-file-ffmpeg feature"
            ))
        }
    }

    /// Read the next frame. `Ok(None)` means end-of-stream.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        match &mut self.backend {
            FileBackend::Synthetic(source) => source.next_frame(),
            #[cfg(feature = "ingest-file-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.next_frame(),
        }
    }

    /// Total frame count when the container reports one.
    pub fn total_frames(&self) -> Option<u64> {
        match &self.backend {
            FileBackend::Synthetic(source) => Some(source.total_frames),
            #[cfg(feature = "ingest-file-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.total_frames(),
        }
    }

    /// Frame dimensions reported by the decoder.
    pub fn frame_size(&self) -> (u32, u32) {
        match &self.backend {
            FileBackend::Synthetic(_) => (SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT),
            #[cfg(feature = "ingest-file-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.frame_size(),
        }
    }

    /// Get frame statistics.
    pub fn stats(&self) -> FileStats {
        match &self.backend {
            FileBackend::Synthetic(source) => source.stats(),
            #[cfg(feature = "ingest-file-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.stats(),
        }
    }
}

/// Statistics for a file source.
#[derive(Clone, Debug)]
pub struct FileStats {
    pub frames_read: u64,
    pub path: String,
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests and demos
// ----------------------------------------------------------------------------

struct SyntheticFileSource {
    path: String,
    total_frames: u64,
    frames_read: u64,
}

impl SyntheticFileSource {
    fn new(path: &str) -> Result<Self> {
        let total_frames = match path.split_once("?frames=") {
            Some((_, count)) => count
                .parse::<u64>()
                .map_err(|_| anyhow!("invalid frame count in {}", path))?,
            None => SYNTHETIC_DEFAULT_FRAMES,
        };
        Ok(Self {
            path: path.to_string(),
            total_frames,
            frames_read: 0,
        })
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.frames_read >= self.total_frames {
            return Ok(None);
        }
        let index = self.frames_read;
        self.frames_read += 1;

        let pixel_count = (SYNTHETIC_WIDTH * SYNTHETIC_HEIGHT * 3) as usize;
        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + index) % 256) as u8;
        }

        Ok(Some(Frame::new(
            pixels,
            SYNTHETIC_WIDTH,
            SYNTHETIC_HEIGHT,
            index,
        )?))
    }

    fn stats(&self) -> FileStats {
        FileStats {
            frames_read: self.frames_read,
            path: self.path.clone(),
        }
    }
}

fn is_local_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if path.starts_with("stub://") {
        return true;
    }
    !path.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_source_yields_exactly_n_frames() {
        let mut source = FileSource::open(FileConfig {
            path: "stub://crowd?frames=3".to_string(),
        })
        .unwrap();
        assert_eq!(source.total_frames(), Some(3));

        for expected_index in 0..3 {
            let frame = source.next_frame().unwrap().expect("frame");
            assert_eq!(frame.index, expected_index);
            assert_eq!((frame.width, frame.height), source.frame_size());
        }
        assert!(source.next_frame().unwrap().is_none());
        // End-of-stream is sticky.
        assert!(source.next_frame().unwrap().is_none());
        assert_eq!(source.stats().frames_read, 3);
    }

    #[test]
    fn url_schemes_are_rejected() {
        for path in ["rtsp://camera-1", "http://example.com/a.mp4", ""] {
            assert!(FileSource::open(FileConfig {
                path: path.to_string(),
            })
            .is_err());
        }
    }

    #[test]
    fn missing_file_is_fatal_at_open() {
        let err = FileSource::open(FileConfig {
            path: "/nonexistent/crowd_video3.mp4".to_string(),
        })
        .err()
        .expect("open should fail for a missing file");
        assert!(err.to_string().contains("could not open video file"));
    }

    #[test]
    fn invalid_stub_frame_count_is_rejected() {
        assert!(FileSource::open(FileConfig {
            path: "stub://crowd?frames=many".to_string(),
        })
        .is_err());
    }
}
