use serde_derive::{Deserialize, Serialize};
use std::io::BufRead;

use crate::detection::Detection;
use crate::error::Error;

/// COCO class index of "sports ball"
pub const SPORTS_BALL_CLASS: i32 = 32;

/// Any backend able to locate the ball in a frame.
pub trait Detector {
    type Frame;

    fn detect(&mut self, frame: &Self::Frame) -> Result<Option<Detection>, Error>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub confidence_threshold: f32,
    /// Accepted classes, empty accepts every class
    pub classes: Vec<i32>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new(0.3, vec![SPORTS_BALL_CLASS])
    }
}

impl DetectorConfig {
    pub fn new(confidence_threshold: f32, classes: Vec<i32>) -> Self {
        Self {
            confidence_threshold,
            classes,
        }
    }

    #[inline]
    pub fn accepts(&self, det: &Detection) -> bool {
        det.confidence >= self.confidence_threshold
            && (self.classes.is_empty() || self.classes.contains(&det.class))
    }
}

/// Picks the most confident detection passing the threshold and class filter.
pub fn select_ball(dets: &[Detection], config: &DetectorConfig) -> Option<Detection> {
    dets.iter()
        .filter(|det| config.accepts(det))
        .fold(None, |best: Option<&Detection>, det| match best {
            Some(b) if b.confidence >= det.confidence => best,
            _ => Some(det),
        })
        .copied()
}

/// Recorded detector output of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionsFrame {
    /// Position of the frame in the video, in milliseconds
    pub offset: u64,
    pub detections: Vec<Detection>,
}

/// Reads dumped detections, one frame per line: `<offset>: <json array>`.
pub struct DetectionsReader<R> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> DetectionsReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn parse(&self, text: &str) -> Result<DetectionsFrame, Error> {
        let err = |reason: &str| Error::DetectionsFormat {
            line: self.line,
            reason: reason.to_string(),
        };

        let idx = text.find(':').ok_or_else(|| err("expected `:`"))?;
        let (offset, vector) = text.split_at(idx);

        let offset = offset
            .trim()
            .parse::<u64>()
            .map_err(|_| err("parse offset failed"))?;
        let detections: Vec<Detection> = serde_json::from_str(&vector[1..])
            .map_err(|e| err(&format!("parse json failed: {}", e)))?;

        Ok(DetectionsFrame { offset, detections })
    }
}

impl<R: BufRead> Iterator for DetectionsReader<R> {
    type Item = Result<DetectionsFrame, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;

            if text.trim().is_empty() {
                continue;
            }

            return Some(self.parse(&text));
        }
    }
}

/// Detector replaying frames recorded by an external model
#[derive(Debug, Clone)]
pub struct ReplayDetector {
    config: DetectorConfig,
}

impl ReplayDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }
}

impl Detector for ReplayDetector {
    type Frame = DetectionsFrame;

    #[inline]
    fn detect(&mut self, frame: &DetectionsFrame) -> Result<Option<Detection>, Error> {
        Ok(select_ball(&frame.detections, &self.config))
    }
}
