//! Constant-velocity Kalman filter over image-pixel coordinates.
//!
//! State vector: `[x, y, vx, vy]ᵀ`. Only the position is observed.

use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::PixelPoint;

type State = na::SVector<f32, 4>;
type Matrix4 = na::SMatrix<f32, 4, 4>;
type Matrix2x4 = na::SMatrix<f32, 2, 4>;
type Matrix4x2 = na::SMatrix<f32, 4, 2>;
type Matrix2 = na::SMatrix<f32, 2, 2>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct KalmanConfig {
    /// Time step between two consecutive frames
    pub dt: f32,
    /// Diagonal scale of the process noise covariance `Q`
    pub process_noise: f32,
    /// Diagonal scale of the observation noise covariance `R`
    pub observation_noise: f32,
    /// Diagonal scale of the covariance the filter starts from
    pub initial_covariance: f32,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            process_noise: 0.1,
            observation_noise: 1.0,
            initial_covariance: 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    transition: Matrix4,
    observation: Matrix2x4,
    process_noise: Matrix4,
    observation_noise: Matrix2,
    state: State,
    covariance: Matrix4,
    initialized: bool,
}

impl KalmanFilter {
    pub fn new(config: &KalmanConfig) -> Self {
        let dt = config.dt;

        #[rustfmt::skip]
        let transition = Matrix4::new(
            1.0, 0.0, dt,  0.0,
            0.0, 1.0, 0.0, dt,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        #[rustfmt::skip]
        let observation = Matrix2x4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
        );

        Self {
            transition,
            observation,
            process_noise: Matrix4::identity() * config.process_noise,
            observation_noise: Matrix2::identity() * config.observation_noise,
            state: State::zeros(),
            covariance: Matrix4::identity() * config.initial_covariance,
            initialized: false,
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn position(&self) -> PixelPoint {
        PixelPoint::new(self.state[0], self.state[1])
    }

    #[inline]
    pub fn velocity(&self) -> na::Vector2<f32> {
        na::Vector2::new(self.state[2], self.state[3])
    }

    #[inline]
    pub fn covariance(&self) -> &na::SMatrix<f32, 4, 4> {
        &self.covariance
    }

    /// Places the filter directly on the first measurement with zero velocity.
    pub fn initialize(&mut self, measurement: PixelPoint) -> PixelPoint {
        self.state = State::new(measurement.x, measurement.y, 0.0, 0.0);
        self.initialized = true;

        info!(x = measurement.x, y = measurement.y, "tracker initialized");

        self.position()
    }

    /// Advances the state one step without a measurement; `P` grows by `Q`.
    pub fn predict(&mut self) -> PixelPoint {
        self.state = self.transition * self.state;
        self.covariance =
            self.transition * self.covariance * self.transition.transpose() + self.process_noise;

        self.position()
    }

    /// Corrects the state with a measured position. An uninitialized filter
    /// has no prior to correct, so the measurement initializes it instead.
    pub fn update(&mut self, measurement: PixelPoint) -> PixelPoint {
        if !self.initialized {
            return self.initialize(measurement);
        }

        let h = self.observation;
        let z = measurement.coords;
        let innovation = z - h * self.state;

        let s = h * self.covariance * h.transpose() + self.observation_noise;

        // R is positive definite, so S is invertible for any valid covariance
        let s_inv = match s.try_inverse() {
            Some(inv) => inv,
            None => {
                debug!("singular innovation covariance, correction skipped");
                return self.position();
            }
        };

        let gain: Matrix4x2 = self.covariance * h.transpose() * s_inv;

        self.state += gain * innovation;
        self.covariance = (Matrix4::identity() - gain * h) * self.covariance;

        self.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn truth(step: usize) -> PixelPoint {
        PixelPoint::new(100.0 + 4.0 * step as f32, 50.0 + 2.5 * step as f32)
    }

    // deterministic, evenly spread noise in [-3, 3)
    fn noise(step: usize) -> (f32, f32) {
        let i = step as f64;
        let nx = (i * 0.618_033_988_7).fract() * 2.0 - 1.0;
        let ny = (i * 0.754_877_666_2 + 0.3).fract() * 2.0 - 1.0;

        ((3.0 * nx) as f32, (3.0 * ny) as f32)
    }

    fn trace(m: &na::SMatrix<f32, 4, 4>) -> f32 {
        (0..4).map(|i| m[(i, i)]).sum()
    }

    #[test]
    fn update_before_initialization_initializes() {
        let mut kf = KalmanFilter::new(&KalmanConfig::default());
        assert!(!kf.is_initialized());

        let pos = kf.update(PixelPoint::new(12.0, 34.0));

        assert!(kf.is_initialized());
        assert_eq!(pos, PixelPoint::new(12.0, 34.0));
        assert_eq!(kf.velocity(), na::Vector2::new(0.0, 0.0));
    }

    #[test]
    fn smooths_noisy_constant_velocity_track() {
        let mut kf = KalmanFilter::new(&KalmanConfig::default());

        let mut est_err = 0.0;
        let mut raw_err = 0.0;

        for step in 0..60 {
            let t = truth(step);
            let (nx, ny) = noise(step);
            let z = PixelPoint::new(t.x + nx, t.y + ny);

            if kf.is_initialized() {
                kf.predict();
            }
            let est = kf.update(z);

            if step >= 10 {
                est_err += (est - t).norm_squared();
                raw_err += nx * nx + ny * ny;
            }
        }

        assert!(
            est_err < raw_err,
            "filtered error {} should be below raw error {}",
            est_err,
            raw_err
        );
    }

    #[test]
    fn predict_extrapolates_last_velocity() {
        let mut kf = KalmanFilter::new(&KalmanConfig::default());

        for step in 0..10 {
            if kf.is_initialized() {
                kf.predict();
            }
            kf.update(truth(step));
        }

        let vel = kf.velocity();
        assert_abs_diff_eq!(vel.x, 4.0, epsilon = 0.01);
        assert_abs_diff_eq!(vel.y, 2.5, epsilon = 0.01);

        let mut prev = kf.position();
        let mut prev_trace = trace(kf.covariance());

        for _ in 0..10 {
            let pos = kf.predict();
            let step = pos - prev;

            assert_abs_diff_eq!(step.x, vel.x, epsilon = 1e-3);
            assert_abs_diff_eq!(step.y, vel.y, epsilon = 1e-3);
            assert_eq!(kf.velocity(), vel);

            let tr = trace(kf.covariance());
            assert!(tr >= prev_trace);

            prev = pos;
            prev_trace = tr;
        }
    }

    #[test]
    fn covariance_stays_symmetric_positive() {
        let mut kf = KalmanFilter::new(&KalmanConfig::default());

        for step in 0..40 {
            let t = truth(step);
            let (nx, ny) = noise(step);

            if kf.is_initialized() {
                kf.predict();
            }

            // drop every fourth measurement
            if step % 4 != 3 {
                kf.update(PixelPoint::new(t.x + nx, t.y + ny));
            }
        }

        let p = kf.covariance().map(|v| v as f64);
        assert_abs_diff_eq!(p, p.transpose(), epsilon = 1e-2);

        let sym = (p + p.transpose()) * 0.5;
        let eigen = sym.symmetric_eigenvalues();
        assert!(eigen.iter().all(|&v| v >= -1e-6), "{:?}", eigen);
    }
}
