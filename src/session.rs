use tracing::{debug, info, warn};

use crate::analytics::{Classification, TrajectoryClassifier};
use crate::bbox::{BBox, Ltrb};
use crate::circular_queue::CircularQueue;
use crate::config::Config;
use crate::detection::Detection;
use crate::error::Error;
use crate::homography::PitchMapper;
use crate::kalman::KalmanFilter;
use crate::report::ResultLog;
use crate::{PixelPoint, WorldPoint};

/// What the presentation layer needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: usize,
    pub bbox: Option<BBox<Ltrb>>,
    pub tracked: Option<PixelPoint>,
    pub world: Option<WorldPoint>,
    pub summary: String,
}

/// Follows a single delivery: tracks, maps and classifies frame by frame.
#[derive(Debug)]
pub struct Session {
    filter: KalmanFilter,
    mapper: PitchMapper,
    classifier: TrajectoryClassifier,
    trail: CircularQueue<PixelPoint>,
    trajectory: Vec<WorldPoint>,
    frames: usize,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self, Error> {
        config.validate()?;

        let mapper = PitchMapper::new(&config.calibration.pixels, &config.calibration.pitch)?;
        let classifier =
            TrajectoryClassifier::new(config.thresholds, config.min_trajectory_points)?;

        Ok(Self {
            filter: KalmanFilter::new(&config.kalman),
            mapper,
            classifier,
            trail: CircularQueue::with_capacity(config.trail_len),
            trajectory: Vec::new(),
            frames: 0,
        })
    }

    /// Feeds the ball detection of the next frame, if there is one.
    pub fn step(&mut self, detection: Option<&Detection>) -> FrameReport {
        let frame = self.frames;
        self.frames += 1;

        let tracked = match detection {
            Some(det) => {
                // without the predict step velocity never reaches the position
                if self.filter.is_initialized() {
                    self.filter.predict();
                }

                Some(self.filter.update(det.center()))
            }
            None if self.filter.is_initialized() => Some(self.filter.predict()),
            None => None,
        };

        let world = tracked.and_then(|px| {
            self.trail.push(px);

            let world = self.mapper.map_to_pitch(px);
            match world {
                Some(pt) => self.trajectory.push(pt),
                None => warn!(frame, x = px.x, y = px.y, "tracked point could not be mapped"),
            }

            world
        });

        let summary = self.classifier.analyze(&self.trajectory).summary();

        debug!(frame, ?tracked, ?world, %summary, "frame processed");

        FrameReport {
            frame,
            bbox: detection.map(Detection::bbox),
            tracked,
            world,
            summary,
        }
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Recent tracked pixel positions, oldest first
    #[inline]
    pub fn trail(&self) -> impl Iterator<Item = &PixelPoint> {
        self.trail.iter()
    }

    #[inline]
    pub fn trajectory(&self) -> &[WorldPoint] {
        &self.trajectory
    }

    #[inline]
    pub fn classification(&self) -> &Classification {
        self.classifier.classification()
    }

    #[inline]
    pub fn summary(&self) -> String {
        self.classifier.summary()
    }

    /// Writes the session row to `log` when a bounce was found. Returns
    /// whether a row was written.
    pub fn finish(&self, log: &ResultLog, source: &str) -> Result<bool, Error> {
        info!(
            source,
            frames = self.frames,
            points = self.trajectory.len(),
            summary = %self.summary(),
            "session finished"
        );

        match self.classifier.record(source) {
            Some(record) => {
                log.append(&record)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
