pub mod analytics;
pub mod bbox;
pub mod circular_queue;
pub mod config;
pub mod detection;
pub mod detector;
pub mod error;
pub mod homography;
pub mod kalman;
pub mod math;
pub mod report;
pub mod session;

pub use analytics::{Classification, DeliveryLength};
pub use config::Config;
pub use detection::Detection;
pub use detector::Detector;
pub use session::{FrameReport, Session};

use nalgebra as na;

/// Position in the image, in pixels
pub type PixelPoint = na::Point2<f32>;

/// Position on the pitch plane, in meters. `Y` grows away from the crease
/// used as origin.
pub type WorldPoint = na::Point2<f32>;

/// Runs every frame of `frames` through a fresh session.
pub fn analyze<D, I>(config: &Config, detector: &mut D, frames: I) -> Result<Session, error::Error>
where
    D: Detector,
    I: IntoIterator<Item = Result<D::Frame, error::Error>>,
{
    analyze_with(config, detector, frames, |_, _, _| {})
}

/// Same as [`analyze`], calling `inspect` after each frame is stepped.
pub fn analyze_with<D, I, F>(
    config: &Config,
    detector: &mut D,
    frames: I,
    mut inspect: F,
) -> Result<Session, error::Error>
where
    D: Detector,
    I: IntoIterator<Item = Result<D::Frame, error::Error>>,
    F: FnMut(&D::Frame, &FrameReport, &Session),
{
    let mut session = Session::new(config)?;

    for frame in frames {
        let frame = frame?;
        let ball = detector.detect(&frame)?;
        let report = session.step(ball.as_ref());

        inspect(&frame, &report, &session);
    }

    Ok(session)
}
