//! Pixel to pitch mapping through a single fixed homography.
//!
//! The ball is assumed to travel on (or close to) the pitch plane. That holds
//! near the bounce and is worst at the top of the flight.

use nalgebra as na;
use tracing::warn;

use crate::error::Error;
use crate::math::homography_dlt;
use crate::{PixelPoint, WorldPoint};

const MIN_HOMOGENEOUS_SCALE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct PitchMapper {
    matrix: Option<na::Matrix3<f64>>,
}

impl PitchMapper {
    /// Builds the mapper from four pixel points and the pitch coordinates (in
    /// meters) they correspond to.
    pub fn new(pixels: &[PixelPoint], pitch: &[WorldPoint]) -> Result<Self, Error> {
        let (src, dst) = match (pixels, pitch) {
            ([p0, p1, p2, p3], [w0, w1, w2, w3]) => (
                [p0, p1, p2, p3].map(|p| na::Point2::new(p.x as f64, p.y as f64)),
                [w0, w1, w2, w3].map(|w| na::Point2::new(w.x as f64, w.y as f64)),
            ),
            _ => {
                return Err(Error::Calibration {
                    pixels: pixels.len(),
                    pitch: pitch.len(),
                })
            }
        };

        let matrix = homography_dlt(&src, &dst);
        if matrix.is_none() {
            warn!(?pixels, ?pitch, "degenerate calibration, no point can be mapped");
        }

        Ok(Self { matrix })
    }

    #[inline]
    pub fn matrix(&self) -> Option<&na::Matrix3<f64>> {
        self.matrix.as_ref()
    }

    pub fn map_to_pitch(&self, pixel: PixelPoint) -> Option<WorldPoint> {
        let h = self.matrix.as_ref()?;
        let p = h * na::Vector3::new(pixel.x as f64, pixel.y as f64, 1.0);

        if p.z.abs() < MIN_HOMOGENEOUS_SCALE {
            return None;
        }

        let (x, y) = (p.x / p.z, p.y / p.z);
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        Some(WorldPoint::new(x as f32, y as f32))
    }
}
