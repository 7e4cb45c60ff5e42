//! Maps a sensor id onto the path of its log file.
//!
//! This is the only place a sensor id becomes part of a path.

use std::path::{Path, PathBuf};

use super::error::StoreError;

pub const LOG_EXTENSION: &str = "log";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileNaming {
    /// `<sensor_id>.log` with the id used as-is. An id containing path
    /// separators or `..` can escape the data directory.
    #[default]
    Verbatim,
    /// Like [FileNaming::Verbatim] but refuses ids that are empty, contain
    /// `/`, `\` or NUL, or are `.`/`..`
    Strict,
}

impl FileNaming {
    pub fn log_path(&self, dir: &Path, sensor_id: &str) -> Result<PathBuf, StoreError> {
        if *self == FileNaming::Strict && !is_plain_name(sensor_id) {
            return Err(StoreError::RejectedSensorId(sensor_id.to_string()));
        }

        Ok(dir.join(format!("{sensor_id}.{LOG_EXTENSION}")))
    }
}

fn is_plain_name(sensor_id: &str) -> bool {
    !sensor_id.is_empty()
        && sensor_id != "."
        && sensor_id != ".."
        && !sensor_id.contains(['/', '\\', '\0'])
}
