use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_BASE_SKIP, DEFAULT_CROP_PADDING_RATIO,
    DEFAULT_EXCLUDED_LABELS, DEFAULT_MAX_MISSING_FRAMES, DEFAULT_MAX_SKIP, DEFAULT_MIN_FACE_SIZE,
    DEFAULT_PERFORMANCE_CHECK_INTERVAL, DEFAULT_SMOOTHING_WINDOW, DEFAULT_TARGET_FPS,
    DEFAULT_TRACKING_IOU_THRESHOLD,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Detection-to-track association strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    #[default]
    Greedy,
    Hungarian,
}

impl MatcherKind {
    pub const ALL: &'static [MatcherKind] = &[MatcherKind::Greedy, MatcherKind::Hungarian];
}

impl std::fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatcherKind::Greedy => write!(f, "greedy"),
            MatcherKind::Hungarian => write!(f, "hungarian"),
        }
    }
}

impl std::str::FromStr for MatcherKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greedy" => Ok(MatcherKind::Greedy),
            "hungarian" => Ok(MatcherKind::Hungarian),
            other => Err(ConfigError::Invalid(format!(
                "matcher must be 'greedy' or 'hungarian', got '{other}'"
            ))),
        }
    }
}

/// Tunables for tracking, smoothing and classification scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionPipelineConfig {
    pub tracking_iou_threshold: f64,
    pub max_missing_frames: usize,
    pub smoothing_window: usize,
    pub base_skip: usize,
    pub max_skip: usize,
    pub target_fps: f64,
    pub performance_check_interval: usize,
    pub min_face_size: i32,
    pub crop_padding_ratio: f64,
    pub excluded_labels: BTreeSet<String>,
    pub matcher: MatcherKind,
}

impl Default for EmotionPipelineConfig {
    fn default() -> Self {
        Self {
            tracking_iou_threshold: DEFAULT_TRACKING_IOU_THRESHOLD,
            max_missing_frames: DEFAULT_MAX_MISSING_FRAMES,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            base_skip: DEFAULT_BASE_SKIP,
            max_skip: DEFAULT_MAX_SKIP,
            target_fps: DEFAULT_TARGET_FPS,
            performance_check_interval: DEFAULT_PERFORMANCE_CHECK_INTERVAL,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            crop_padding_ratio: DEFAULT_CROP_PADDING_RATIO,
            excluded_labels: DEFAULT_EXCLUDED_LABELS
                .iter()
                .map(|l| l.to_string())
                .collect(),
            matcher: MatcherKind::default(),
        }
    }
}

impl EmotionPipelineConfig {
    /// `<user config dir>/moodtrack/config.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config from the default location, falling back to defaults
    /// when no file exists there.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.tracking_iou_threshold) {
            return Err(invalid(format!(
                "tracking_iou_threshold must be between 0.0 and 1.0, got {}",
                self.tracking_iou_threshold
            )));
        }
        if self.smoothing_window == 0 {
            return Err(invalid("smoothing_window must be >= 1".to_string()));
        }
        if self.max_skip == 0 {
            return Err(invalid("max_skip must be >= 1".to_string()));
        }
        if self.base_skip == 0 || self.base_skip > self.max_skip {
            return Err(invalid(format!(
                "base_skip must be between 1 and max_skip ({}), got {}",
                self.max_skip, self.base_skip
            )));
        }
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(invalid(format!(
                "target_fps must be positive, got {}",
                self.target_fps
            )));
        }
        if self.performance_check_interval == 0 {
            return Err(invalid(
                "performance_check_interval must be >= 1".to_string(),
            ));
        }
        if self.min_face_size < 0 {
            return Err(invalid(format!(
                "min_face_size must not be negative, got {}",
                self.min_face_size
            )));
        }
        if !(0.0..=1.0).contains(&self.crop_padding_ratio) {
            return Err(invalid(format!(
                "crop_padding_ratio must be between 0.0 and 1.0, got {}",
                self.crop_padding_ratio
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EmotionPipelineConfig::default();
        assert_relative_eq!(config.tracking_iou_threshold, 0.3);
        assert_eq!(config.max_missing_frames, 10);
        assert_eq!(config.smoothing_window, 5);
        assert_eq!(config.base_skip, 1);
        assert_eq!(config.max_skip, 10);
        assert_relative_eq!(config.target_fps, 10.0);
        assert_eq!(config.performance_check_interval, 10);
        assert!(config.excluded_labels.contains("Ahegao"));
        assert_eq!(config.matcher, MatcherKind::Greedy);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::threshold_above_one(|c: &mut EmotionPipelineConfig| c.tracking_iou_threshold = 1.5)]
    #[case::zero_window(|c: &mut EmotionPipelineConfig| c.smoothing_window = 0)]
    #[case::zero_max_skip(|c: &mut EmotionPipelineConfig| { c.max_skip = 0; c.base_skip = 0; })]
    #[case::zero_base_skip(|c: &mut EmotionPipelineConfig| c.base_skip = 0)]
    #[case::base_above_max(|c: &mut EmotionPipelineConfig| c.base_skip = 11)]
    #[case::zero_fps(|c: &mut EmotionPipelineConfig| c.target_fps = 0.0)]
    #[case::nan_fps(|c: &mut EmotionPipelineConfig| c.target_fps = f64::NAN)]
    #[case::zero_interval(|c: &mut EmotionPipelineConfig| c.performance_check_interval = 0)]
    #[case::negative_face_size(|c: &mut EmotionPipelineConfig| c.min_face_size = -1)]
    #[case::padding_too_large(|c: &mut EmotionPipelineConfig| c.crop_padding_ratio = 2.0)]
    fn test_validate_rejects(#[case] mutate: fn(&mut EmotionPipelineConfig)) {
        let mut config = EmotionPipelineConfig::default();
        mutate(&mut config);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_partial_json_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"target_fps": 15.0, "matcher": "hungarian"}}"#).unwrap();

        let config = EmotionPipelineConfig::load(file.path()).unwrap();

        assert_relative_eq!(config.target_fps, 15.0);
        assert_eq!(config.matcher, MatcherKind::Hungarian);
        assert_eq!(config.max_skip, 10);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"base_skip": 20}}"#).unwrap();

        let err = EmotionPipelineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = EmotionPipelineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EmotionPipelineConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_matcher_kind_parsing() {
        assert_eq!("Greedy".parse::<MatcherKind>().unwrap(), MatcherKind::Greedy);
        assert_eq!(
            "hungarian".parse::<MatcherKind>().unwrap(),
            MatcherKind::Hungarian
        );
        assert!("optimal".parse::<MatcherKind>().is_err());
        assert_eq!(MatcherKind::ALL.len(), 2);
        assert_eq!(MatcherKind::Hungarian.to_string(), "hungarian");
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = EmotionPipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EmotionPipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
