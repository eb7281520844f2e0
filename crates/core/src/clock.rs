use crate::error::TimestampError;
use crate::metadata::{system_time_to_local, TimeSource};
use chrono::NaiveDateTime;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Outcome of asking the platform for an optional timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Found(SystemTime),
    Unsupported,
}

/// Filesystem timestamps, one capability per tier.
///
/// `Probe::Unsupported` means "this platform or filesystem cannot tell"; an
/// `Err` means the file itself could not be inspected.
pub trait FileClock {
    fn created(&self, path: &Path) -> io::Result<Probe>;
    fn birth_time(&self, path: &Path) -> io::Result<Probe>;
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl FileClock for SystemClock {
    fn created(&self, path: &Path) -> io::Result<Probe> {
        let meta = fs::metadata(path)?;
        match meta.created() {
            Ok(time) => Ok(Probe::Found(time)),
            Err(err) if err.kind() == io::ErrorKind::Unsupported => Ok(Probe::Unsupported),
            Err(err) => Err(err),
        }
    }

    #[cfg(target_os = "macos")]
    fn birth_time(&self, path: &Path) -> io::Result<Probe> {
        use std::os::macos::fs::MetadataExt;
        let meta = fs::metadata(path)?;
        Ok(birth_probe(meta.st_birthtime(), meta.st_birthtime_nsec()))
    }

    #[cfg(target_os = "freebsd")]
    fn birth_time(&self, path: &Path) -> io::Result<Probe> {
        use std::os::freebsd::fs::MetadataExt;
        let meta = fs::metadata(path)?;
        Ok(birth_probe(meta.st_birthtime(), meta.st_birthtime_nsec()))
    }

    #[cfg(not(any(target_os = "macos", target_os = "freebsd")))]
    fn birth_time(&self, path: &Path) -> io::Result<Probe> {
        fs::metadata(path)?;
        Ok(Probe::Unsupported)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }
}

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
fn birth_probe(secs: i64, nanos: i64) -> Probe {
    use std::time::{Duration, UNIX_EPOCH};
    // A zero birth time is what filesystems without the field report.
    if secs <= 0 {
        return Probe::Unsupported;
    }
    Probe::Found(UNIX_EPOCH + Duration::new(secs as u64, nanos.clamp(0, 999_999_999) as u32))
}

/// Walks creation time, then birth time, then modification time.
pub fn filesystem_time<C: FileClock + ?Sized>(
    clock: &C,
    path: &Path,
) -> Result<(NaiveDateTime, TimeSource), TimestampError> {
    let unreadable = |source: io::Error| TimestampError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    if let Probe::Found(time) = clock.created(path).map_err(unreadable)? {
        return Ok((system_time_to_local(time), TimeSource::FileCreated));
    }
    if let Probe::Found(time) = clock.birth_time(path).map_err(unreadable)? {
        return Ok((system_time_to_local(time), TimeSource::FileBirthTime));
    }
    let time = clock.modified(path).map_err(unreadable)?;
    Ok((system_time_to_local(time), TimeSource::FileModified))
}
