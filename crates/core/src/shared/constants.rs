pub const DEFAULT_TRACKING_IOU_THRESHOLD: f64 = 0.3;

/// Max consecutive missed frames before a track is removed (~1 second at 10 fps).
pub const DEFAULT_MAX_MISSING_FRAMES: usize = 10;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

pub const DEFAULT_BASE_SKIP: usize = 1;
pub const DEFAULT_MAX_SKIP: usize = 10;
pub const DEFAULT_TARGET_FPS: f64 = 10.0;
pub const DEFAULT_PERFORMANCE_CHECK_INTERVAL: usize = 10;

/// Detections smaller than this in either dimension are discarded.
pub const DEFAULT_MIN_FACE_SIZE: i32 = 50;

/// Fraction of the face size added on every side of a classifier crop.
pub const DEFAULT_CROP_PADDING_RATIO: f64 = 0.2;

pub const DEFAULT_EXCLUDED_LABELS: &[&str] = &["Ahegao"];

/// Largest frame side a session trace may declare.
pub const MAX_TRACE_DIMENSION: u32 = 16384;

pub const UNKNOWN_LABEL: &str = "Unknown";

pub const CONFIG_DIR_NAME: &str = "moodtrack";
pub const CONFIG_FILE_NAME: &str = "config.json";
