use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::analytics::DeliveryLength;
use crate::error::Error;
use crate::math::round_to;
use crate::WorldPoint;

const HEADER: &str = "video_file,delivery_type,bounce_point_x_m,bounce_point_y_m";

/// Final outcome of one delivery, one row of the result log
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub source: String,
    pub delivery_type: String,
    pub bounce_x: f32,
    pub bounce_y: f32,
}

impl SessionRecord {
    pub fn new(source: &str, length: DeliveryLength, bounce: WorldPoint) -> Self {
        Self {
            source: source.to_string(),
            delivery_type: length.to_string(),
            bounce_x: round_to(bounce.x, 2),
            bounce_y: round_to(bounce.y, 2),
        }
    }

    fn to_row(&self) -> String {
        format!(
            "{},{},{:.2},{:.2}",
            escape(&self.source),
            escape(&self.delivery_type),
            self.bounce_x,
            self.bounce_y
        )
    }
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// File name of the input, used to identify the session in the log.
pub fn source_id<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Append-only CSV log, one row per analysed delivery
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &SessionRecord) -> Result<(), Error> {
        let is_new = !self.path.is_file();

        if is_new {
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if is_new {
            writeln!(file, "{}", HEADER)?;
        }
        writeln!(file, "{}", record.to_row())?;

        info!(path = %self.path.display(), delivery = %record.delivery_type, "result logged");

        Ok(())
    }
}
