use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_VIDEO_PATH: &str = "crowd_video3.mp4";
const DEFAULT_BACKEND: &str = "tract";
const DEFAULT_MODEL_PATH: &str = "yolov3.onnx";
const DEFAULT_LABELS_PATH: &str = "coco.names";
const DEFAULT_INPUT_SIZE: u32 = 416;
const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;
const DEFAULT_NMS_IOU: f32 = 0.4;
const DEFAULT_WINDOW_TITLE: &str = "Crowd Detection";
const DEFAULT_WAIT_MS: i32 = 25;

#[derive(Debug, Deserialize, Default)]
struct CrowdwatchConfigFile {
    video_path: Option<String>,
    detector: Option<DetectorConfigFile>,
    display: Option<DisplayConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    backend: Option<String>,
    model_path: Option<String>,
    labels_path: Option<String>,
    input_size: Option<u32>,
    score_threshold: Option<f32>,
    nms_iou: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct DisplayConfigFile {
    headless: Option<bool>,
    window_title: Option<String>,
    wait_ms: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct CrowdwatchConfig {
    pub video_path: String,
    pub detector: DetectorSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub backend: String,
    pub model_path: String,
    pub labels_path: String,
    pub input_size: u32,
    pub score_threshold: f32,
    pub nms_iou: f32,
}

#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub headless: bool,
    pub window_title: String,
    pub wait_ms: i32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            model_path: DEFAULT_MODEL_PATH.to_string(),
            labels_path: DEFAULT_LABELS_PATH.to_string(),
            input_size: DEFAULT_INPUT_SIZE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            nms_iou: DEFAULT_NMS_IOU,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            headless: false,
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            wait_ms: DEFAULT_WAIT_MS,
        }
    }
}

impl Default for CrowdwatchConfig {
    fn default() -> Self {
        Self {
            video_path: DEFAULT_VIDEO_PATH.to_string(),
            detector: DetectorSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl CrowdwatchConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CROWDWATCH_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: CrowdwatchConfigFile) -> Self {
        let defaults = Self::default();
        let detector_file = file.detector.unwrap_or_default();
        let display_file = file.display.unwrap_or_default();
        Self {
            video_path: file.video_path.unwrap_or(defaults.video_path),
            detector: DetectorSettings {
                backend: detector_file.backend.unwrap_or(defaults.detector.backend),
                model_path: detector_file
                    .model_path
                    .unwrap_or(defaults.detector.model_path),
                labels_path: detector_file
                    .labels_path
                    .unwrap_or(defaults.detector.labels_path),
                input_size: detector_file
                    .input_size
                    .unwrap_or(defaults.detector.input_size),
                score_threshold: detector_file
                    .score_threshold
                    .unwrap_or(defaults.detector.score_threshold),
                nms_iou: detector_file.nms_iou.unwrap_or(defaults.detector.nms_iou),
            },
            display: DisplaySettings {
                headless: display_file.headless.unwrap_or(defaults.display.headless),
                window_title: display_file
                    .window_title
                    .unwrap_or(defaults.display.window_title),
                wait_ms: display_file.wait_ms.unwrap_or(defaults.display.wait_ms),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("CROWDWATCH_VIDEO") {
            if !path.trim().is_empty() {
                self.video_path = path;
            }
        }
        if let Ok(backend) = std::env::var("CROWDWATCH_BACKEND") {
            if !backend.trim().is_empty() {
                self.detector.backend = backend;
            }
        }
        if let Ok(path) = std::env::var("CROWDWATCH_MODEL") {
            if !path.trim().is_empty() {
                self.detector.model_path = path;
            }
        }
        if let Ok(path) = std::env::var("CROWDWATCH_LABELS") {
            if !path.trim().is_empty() {
                self.detector.labels_path = path;
            }
        }
        if let Ok(value) = std::env::var("CROWDWATCH_SCORE_THRESHOLD") {
            self.detector.score_threshold = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("CROWDWATCH_SCORE_THRESHOLD must be a number"))?;
        }
        if let Ok(value) = std::env::var("CROWDWATCH_NMS_IOU") {
            self.detector.nms_iou = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("CROWDWATCH_NMS_IOU must be a number"))?;
        }
        if let Ok(value) = std::env::var("CROWDWATCH_INPUT_SIZE") {
            self.detector.input_size = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("CROWDWATCH_INPUT_SIZE must be an integer"))?;
        }
        if let Ok(title) = std::env::var("CROWDWATCH_WINDOW_TITLE") {
            if !title.trim().is_empty() {
                self.display.window_title = title;
            }
        }
        if let Ok(value) = std::env::var("CROWDWATCH_WAIT_MS") {
            self.display.wait_ms = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("CROWDWATCH_WAIT_MS must be an integer number of ms"))?;
        }
        if let Ok(headless) = std::env::var("CROWDWATCH_HEADLESS") {
            self.display.headless = match headless.trim() {
                "1" | "true" => true,
                "0" | "false" => false,
                other => {
                    return Err(anyhow!(
                        "CROWDWATCH_HEADLESS must be 0/1/true/false, got '{}'",
                        other
                    ))
                }
            };
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.video_path.trim().is_empty() {
            return Err(anyhow!("video path must not be empty"));
        }
        if self.detector.backend.trim().is_empty() {
            return Err(anyhow!("detector backend must not be empty"));
        }
        if self.detector.input_size == 0 {
            return Err(anyhow!("detector input size must be greater than zero"));
        }
        for (name, value) in [
            ("score_threshold", self.detector.score_threshold),
            ("nms_iou", self.detector.nms_iou),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} must be within [0, 1], got {}", name, value));
            }
        }
        if self.display.wait_ms <= 0 {
            return Err(anyhow!("display wait_ms must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<CrowdwatchConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_deployment() {
        let cfg = CrowdwatchConfig::default();
        assert_eq!(cfg.video_path, "crowd_video3.mp4");
        assert_eq!(cfg.detector.backend, "tract");
        assert_eq!(cfg.detector.model_path, "yolov3.onnx");
        assert_eq!(cfg.detector.labels_path, "coco.names");
        assert_eq!(cfg.detector.input_size, 416);
        assert!((cfg.detector.score_threshold - 0.5).abs() < f32::EPSILON);
        assert!((cfg.detector.nms_iou - 0.4).abs() < f32::EPSILON);
        assert!(!cfg.display.headless);
        assert_eq!(cfg.display.wait_ms, 25);
    }

    #[test]
    fn thresholds_outside_unit_interval_are_rejected() {
        let mut cfg = CrowdwatchConfig::default();
        cfg.detector.score_threshold = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = CrowdwatchConfig::default();
        cfg.detector.nms_iou = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_input_size_is_rejected() {
        let mut cfg = CrowdwatchConfig::default();
        cfg.detector.input_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_file_config_keeps_defaults_elsewhere() {
        let file: CrowdwatchConfigFile =
            serde_json::from_str(r#"{"detector": {"backend": "stub"}}"#).unwrap();
        let cfg = CrowdwatchConfig::from_file(file);
        assert_eq!(cfg.detector.backend, "stub");
        assert_eq!(cfg.detector.input_size, 416);
        assert_eq!(cfg.video_path, "crowd_video3.mp4");
    }
}
