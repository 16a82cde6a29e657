use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::analytics::{LengthThresholds, MIN_TRAJECTORY_POINTS};
use crate::detector::DetectorConfig;
use crate::error::Error;
use crate::kalman::KalmanConfig;
use crate::{PixelPoint, WorldPoint};

pub const DEFAULT_TRAIL_LEN: usize = 30;

/// Four pixel corners of a known rectangle on the pitch and their metric
/// coordinates. The default is the batting crease of the reference camera,
/// with the origin at the crease center and `Y` growing down the pitch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Calibration {
    pub pixels: Vec<PixelPoint>,
    pub pitch: Vec<WorldPoint>,
}

impl Default for Calibration {
    fn default() -> Self {
        let half_width = 2.64 / 2.0;
        let depth = 1.22;

        Self {
            pixels: vec![
                PixelPoint::new(667.0, 547.0),
                PixelPoint::new(1310.0, 549.0),
                PixelPoint::new(664.0, 583.0),
                PixelPoint::new(1311.0, 586.0),
            ],
            pitch: vec![
                WorldPoint::new(-half_width, 0.0),
                WorldPoint::new(half_width, 0.0),
                WorldPoint::new(-half_width, depth),
                WorldPoint::new(half_width, depth),
            ],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub calibration: Calibration,
    pub thresholds: LengthThresholds,
    pub kalman: KalmanConfig,
    pub trail_len: usize,
    pub min_trajectory_points: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            calibration: Calibration::default(),
            thresholds: LengthThresholds::default(),
            kalman: KalmanConfig::default(),
            trail_len: DEFAULT_TRAIL_LEN,
            min_trajectory_points: MIN_TRAJECTORY_POINTS,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let (pixels, pitch) = (self.calibration.pixels.len(), self.calibration.pitch.len());
        if pixels != 4 || pitch != 4 {
            return Err(Error::Calibration { pixels, pitch });
        }

        self.thresholds.validate()
    }
}
