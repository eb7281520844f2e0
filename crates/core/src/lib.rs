mod apply;
mod clock;
mod config;
mod error;
mod exif_reader;
mod media;
mod metadata;
mod planner;
mod progress;
mod report;
mod resolver;

pub use apply::{
    apply_presented, ApplyResult, CompletedRename, RENAME_IMAGES_LABEL, RENAME_VIDEOS_LABEL,
};
pub use clock::{filesystem_time, FileClock, Probe, SystemClock};
pub use config::{app_paths, load_config, load_config_from, AppConfig, AppPaths};
pub use error::{ApplyError, TimestampError};
pub use exif_reader::{parse_exif_datetime, read_capture_time};
pub use media::{collect_media_files, MediaFiles, MediaKind, ScanStats};
pub use metadata::{truncate_to_second, CaptureRecord, TimeSource};
pub use planner::{
    generate_plan, plan_records, plan_renames, target_path_for, MediaPlan, PlanOptions,
    RenameEntry, RenamePlan, TARGET_DATE_FORMAT,
};
pub use progress::{ProgressReporter, SilentReporter};
pub use report::{present, render_line, PresentedRename};
pub use resolver::{TimestampResolver, EXTRACT_LABEL};
