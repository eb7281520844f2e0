use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Unclassified,
}

impl MediaKind {
    /// Classifies a path by its extension, ignoring case.
    pub fn of(path: &Path) -> Self {
        let Some(ext) = path.extension().map(|v| v.to_string_lossy()) else {
            return MediaKind::Unclassified;
        };

        if has_extension(&ext, IMAGE_EXTENSIONS) {
            MediaKind::Image
        } else if has_extension(&ext, VIDEO_EXTENSIONS) {
            MediaKind::Video
        } else {
            MediaKind::Unclassified
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Unclassified => "other",
        }
    }
}

fn has_extension(ext: &str, allowed: &[&str]) -> bool {
    allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(ext))
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub scanned_files: usize,
    pub image_files: usize,
    pub video_files: usize,
    pub skipped_unclassified: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MediaFiles {
    pub images: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
    pub stats: ScanStats,
}

impl MediaFiles {
    pub fn total(&self) -> usize {
        self.images.len() + self.videos.len()
    }
}

/// Lists the regular files directly inside `root` and splits them into image
/// and video batches. Subdirectories are not entered.
pub fn collect_media_files(root: &Path) -> Result<MediaFiles> {
    let mut out = MediaFiles::default();

    for entry in
        fs::read_dir(root).with_context(|| format!("cannot read directory: {}", root.display()))?
    {
        let entry = entry.with_context(|| format!("cannot read entry in: {}", root.display()))?;
        let path = entry.path();
        if !path.is_file() {
            if !path.is_dir() {
                warn!(path = %path.display(), "skipping entry that is not a regular file");
            }
            continue;
        }
        out.stats.scanned_files += 1;

        match MediaKind::of(&path) {
            MediaKind::Image => {
                out.stats.image_files += 1;
                out.images.push(path);
            }
            MediaKind::Video => {
                out.stats.video_files += 1;
                out.videos.push(path);
            }
            MediaKind::Unclassified => out.stats.skipped_unclassified += 1,
        }
    }

    out.images.sort();
    out.videos.sort();
    Ok(out)
}
