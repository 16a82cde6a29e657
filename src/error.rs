use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Calibration Error: exactly 4 pixel and 4 pitch points are required, got {pixels} and {pitch}")]
    Calibration { pixels: usize, pitch: usize },

    #[error("Thresholds Error: full length ({full_m}m) must be shorter than good length ({good_m}m)")]
    Thresholds { full_m: f32, good_m: f32 },

    #[error("Detections Format Error at line {line}: {reason}")]
    DetectionsFormat { line: usize, reason: String },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}
