use crate::media::MediaKind;
use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeSource {
    ExifDateTimeOriginal,
    FileCreated,
    FileBirthTime,
    FileModified,
}

impl TimeSource {
    pub fn is_embedded(self) -> bool {
        matches!(self, TimeSource::ExifDateTimeOriginal)
    }
}

/// The resolved capture instant of one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptureRecord {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub instant: NaiveDateTime,
    pub source: TimeSource,
}

/// Drops everything below one second. Target names only carry whole seconds,
/// so instants are compared at that resolution too.
pub fn truncate_to_second(instant: NaiveDateTime) -> NaiveDateTime {
    instant.with_nanosecond(0).unwrap_or(instant)
}

pub(crate) fn system_time_to_local(time: SystemTime) -> NaiveDateTime {
    truncate_to_second(DateTime::<Local>::from(time).naive_local())
}
