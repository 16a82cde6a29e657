//! Bounce detection and delivery length classification over the mapped
//! trajectory.
//!
//! The bounce is taken as the farthest point down the pitch (largest `Y`)
//! seen so far, provided it is neither the first nor the last point. A ball
//! bouncing twice in view can be misread; this heuristic assumes a single
//! dominant bounce per delivery.

use serde_derive::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;
use crate::report::SessionRecord;
use crate::WorldPoint;

pub const MIN_TRAJECTORY_POINTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryLength {
    Undetermined,
    Full,
    GoodLength,
    Short,
}

impl DeliveryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryLength::Undetermined => "Undetermined",
            DeliveryLength::Full => "Full",
            DeliveryLength::GoodLength => "Good Length",
            DeliveryLength::Short => "Short",
        }
    }
}

impl fmt::Display for DeliveryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distances (meters, from the crease origin) separating the length zones
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LengthThresholds {
    pub full_m: f32,
    pub good_m: f32,
}

impl Default for LengthThresholds {
    fn default() -> Self {
        Self {
            full_m: 2.5,
            good_m: 6.0,
        }
    }
}

impl LengthThresholds {
    pub fn validate(&self) -> Result<(), Error> {
        if self.full_m < self.good_m {
            Ok(())
        } else {
            Err(Error::Thresholds {
                full_m: self.full_m,
                good_m: self.good_m,
            })
        }
    }

    pub fn classify(&self, bounce_y: f32) -> DeliveryLength {
        if bounce_y <= self.full_m {
            DeliveryLength::Full
        } else if bounce_y <= self.good_m {
            DeliveryLength::GoodLength
        } else {
            DeliveryLength::Short
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceEstimate {
    pub index: usize,
    pub point: WorldPoint,
}

/// Locates the bounce among the interior points of `trajectory`.
pub fn find_bounce(trajectory: &[WorldPoint], min_points: usize) -> Option<BounceEstimate> {
    if trajectory.len() < min_points.max(3) {
        return None;
    }

    let (index, point) = trajectory
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, &WorldPoint)>, (idx, pt)| match best {
            Some((_, b)) if b.y >= pt.y => best,
            _ => Some((idx, pt)),
        })?;

    if index == 0 || index == trajectory.len() - 1 {
        return None;
    }

    Some(BounceEstimate {
        index,
        point: *point,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub length: DeliveryLength,
    pub bounce: Option<BounceEstimate>,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            length: DeliveryLength::Undetermined,
            bounce: None,
        }
    }
}

impl Classification {
    pub fn summary(&self) -> String {
        match &self.bounce {
            Some(bounce) => format!("{} | Bounce Y: {:.2}m", self.length, bounce.point.y),
            None => String::from("Analyzing..."),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrajectoryClassifier {
    thresholds: LengthThresholds,
    min_points: usize,
    current: Classification,
}

impl TrajectoryClassifier {
    pub fn new(thresholds: LengthThresholds, min_points: usize) -> Result<Self, Error> {
        thresholds.validate()?;

        Ok(Self {
            thresholds,
            min_points,
            current: Classification::default(),
        })
    }

    #[inline]
    pub fn thresholds(&self) -> &LengthThresholds {
        &self.thresholds
    }

    #[inline]
    pub fn classification(&self) -> &Classification {
        &self.current
    }

    /// Re-evaluates the whole trajectory. A verified bounce replaces the
    /// current classification; otherwise the last verified one is kept.
    pub fn analyze(&mut self, trajectory: &[WorldPoint]) -> &Classification {
        if let Some(bounce) = find_bounce(trajectory, self.min_points) {
            self.current = Classification {
                length: self.thresholds.classify(bounce.point.y),
                bounce: Some(bounce),
            };
        }

        &self.current
    }

    #[inline]
    pub fn summary(&self) -> String {
        self.current.summary()
    }

    /// The row describing this delivery, if a bounce was ever found.
    pub fn record(&self, source: &str) -> Option<SessionRecord> {
        let bounce = self.current.bounce?;

        Some(SessionRecord::new(
            source,
            self.current.length,
            bounce.point,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory(ys: &[f32]) -> Vec<WorldPoint> {
        ys.iter().map(|&y| WorldPoint::new(0.1, y)).collect()
    }

    fn classify(ys: &[f32]) -> Classification {
        let mut classifier =
            TrajectoryClassifier::new(LengthThresholds::default(), MIN_TRAJECTORY_POINTS).unwrap();

        *classifier.analyze(&trajectory(ys))
    }

    #[test]
    fn classifies_by_bounce_distance() {
        assert_eq!(classify(&[0.5, 1.0, 2.0, 1.5, 1.0]).length, DeliveryLength::Full);
        assert_eq!(classify(&[1.0, 2.0, 4.0, 3.0, 2.0]).length, DeliveryLength::GoodLength);
        assert_eq!(classify(&[2.0, 5.0, 7.5, 6.0, 5.0]).length, DeliveryLength::Short);
    }

    #[test]
    fn threshold_edges_are_inclusive() {
        let t = LengthThresholds::default();

        assert_eq!(t.classify(2.5), DeliveryLength::Full);
        assert_eq!(t.classify(2.51), DeliveryLength::GoodLength);
        assert_eq!(t.classify(6.0), DeliveryLength::GoodLength);
        assert_eq!(t.classify(6.01), DeliveryLength::Short);
    }

    #[test]
    fn short_trajectory_is_undetermined() {
        let c = classify(&[1.0, 4.0, 2.0, 1.0]);

        assert_eq!(c.length, DeliveryLength::Undetermined);
        assert_eq!(c.bounce, None);
        assert_eq!(c.summary(), "Analyzing...");
    }

    #[test]
    fn bounce_at_either_end_is_not_verified() {
        let first = classify(&[7.0, 5.0, 4.0, 3.0, 2.0]);
        assert_eq!(first.length, DeliveryLength::Undetermined);
        assert_eq!(first.bounce, None);

        let last = classify(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(last.length, DeliveryLength::Undetermined);
        assert_eq!(last.bounce, None);
    }

    #[test]
    fn bounce_point_and_summary() {
        let c = classify(&[1.0, 2.0, 4.321, 3.0, 2.0]);
        let bounce = c.bounce.unwrap();

        assert_eq!(bounce.index, 2);
        assert_eq!(bounce.point, WorldPoint::new(0.1, 4.321));
        assert_eq!(c.summary(), "Good Length | Bounce Y: 4.32m");
    }

    #[test]
    fn ties_pick_the_first_maximum() {
        let bounce = find_bounce(&trajectory(&[1.0, 3.0, 3.0, 2.0, 1.0]), 5).unwrap();

        assert_eq!(bounce.index, 1);
    }

    #[test]
    fn classification_follows_growing_trajectory() {
        let mut classifier =
            TrajectoryClassifier::new(LengthThresholds::default(), MIN_TRAJECTORY_POINTS).unwrap();
        let mut points = Vec::new();

        for y in [0.5, 1.0, 1.5, 2.0, 2.2] {
            points.push(WorldPoint::new(0.0, y));
            classifier.analyze(&points);
        }
        assert_eq!(classifier.classification().length, DeliveryLength::Undetermined);

        points.push(WorldPoint::new(0.0, 1.8));
        assert_eq!(classifier.analyze(&points).length, DeliveryLength::Full);

        // running maximum moves further down the pitch
        points.push(WorldPoint::new(0.0, 4.0));
        assert_eq!(classifier.analyze(&points).length, DeliveryLength::Full);
        points.push(WorldPoint::new(0.0, 3.5));
        assert_eq!(classifier.analyze(&points).length, DeliveryLength::GoodLength);
        assert_eq!(classifier.classification().bounce.unwrap().index, 6);
    }

    #[test]
    fn record_only_after_bounce() {
        let mut classifier =
            TrajectoryClassifier::new(LengthThresholds::default(), MIN_TRAJECTORY_POINTS).unwrap();
        assert!(classifier.record("delivery.mp4").is_none());

        classifier.analyze(&trajectory(&[1.0, 2.0, 7.456, 3.0, 2.0]));
        let record = classifier.record("delivery.mp4").unwrap();

        assert_eq!(record.delivery_type, "Short");
        assert_eq!(record.source, "delivery.mp4");
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let t = LengthThresholds {
            full_m: 6.0,
            good_m: 2.5,
        };

        assert!(matches!(
            TrajectoryClassifier::new(t, MIN_TRAJECTORY_POINTS),
            Err(Error::Thresholds { .. })
        ));
    }
}
