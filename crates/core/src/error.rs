use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::apply::CompletedRename;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed capture time {value:?} in {}", .path.display())]
    MalformedCaptureTime { path: PathBuf, value: String },
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("refusing to rename {} -> {}: {reason}", .original.display(), .target.display())]
    Conflict {
        original: PathBuf,
        target: PathBuf,
        reason: &'static str,
    },
    #[error(
        "rename failed {} -> {} after {} completed: {source}",
        .from.display(),
        .to.display(),
        .completed.len()
    )]
    Rename {
        from: PathBuf,
        to: PathBuf,
        completed: Vec<CompletedRename>,
        /// Originals still parked under a temporary name.
        stranded: Vec<CompletedRename>,
        #[source]
        source: io::Error,
    },
}
