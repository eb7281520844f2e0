use crate::clock::{filesystem_time, FileClock};
use crate::error::TimestampError;
use crate::exif_reader::read_capture_time;
use crate::media::MediaKind;
use crate::metadata::{truncate_to_second, CaptureRecord, TimeSource};
use crate::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const EXTRACT_LABEL: &str = "Extracting info";

/// Resolves one capture instant per file, preferring embedded EXIF over
/// filesystem timestamps.
pub struct TimestampResolver<C> {
    clock: C,
}

impl<C: FileClock> TimestampResolver<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn resolve(&self, path: &Path, kind: MediaKind) -> Result<CaptureRecord, TimestampError> {
        let embedded = match kind {
            MediaKind::Image => read_capture_time(path)?,
            MediaKind::Video | MediaKind::Unclassified => None,
        };

        let (instant, source) = match embedded {
            Some(instant) => (truncate_to_second(instant), TimeSource::ExifDateTimeOriginal),
            None => filesystem_time(&self.clock, path)?,
        };

        debug!(path = %path.display(), %instant, ?source, "resolved capture time");
        Ok(CaptureRecord {
            path: path.to_path_buf(),
            kind,
            instant,
            source,
        })
    }

    /// Resolves `files` in order. The first failure aborts the whole batch.
    pub fn resolve_all(
        &self,
        files: &[(PathBuf, MediaKind)],
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<CaptureRecord>, TimestampError> {
        progress.on_phase_start(EXTRACT_LABEL, files.len());
        let mut records = Vec::with_capacity(files.len());
        for (index, (path, kind)) in files.iter().enumerate() {
            records.push(self.resolve(path, *kind)?);
            progress.on_item_done(index + 1, files.len());
        }
        progress.on_phase_complete(EXTRACT_LABEL, files.len());
        Ok(records)
    }
}
