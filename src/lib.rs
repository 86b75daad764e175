//! crowdwatch: person detection and counting over local video files.
//!
//! The crate wires four layers into a sequential playback loop:
//!
//! - [`ingest`]: decodes a local video file into packed RGB frames
//! - [`detect`]: runs an ONNX detector and keeps confident person boxes
//! - [`annotate`]: suppresses overlaps, draws boxes, and counts the crowd
//! - [`display`]: presents annotated frames in a window or headlessly
//!
//! [`pipeline::Session`] owns the loop. Heavy native dependencies are
//! feature-gated (`ingest-file-ffmpeg`, `backend-tract`, `display-highgui`)
//! so the default build stays pure Rust and runs against synthetic sources.

pub mod annotate;
pub mod config;
pub mod detect;
pub mod display;
pub mod frame;
pub mod ingest;
pub mod pipeline;

pub use config::CrowdwatchConfig;
pub use frame::Frame;
pub use pipeline::{RunSummary, Session};
