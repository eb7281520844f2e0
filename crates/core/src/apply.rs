use crate::error::ApplyError;
use crate::progress::ProgressReporter;
use crate::report::PresentedRename;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

pub const RENAME_IMAGES_LABEL: &str = "Renaming image files";
pub const RENAME_VIDEOS_LABEL: &str = "Renaming video files";

const TEMP_PREFIX: &str = ".exif_renamer_tmp_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedRename {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplyResult {
    pub applied: usize,
    pub unchanged: usize,
    pub completed: Vec<CompletedRename>,
}

/// Renames every entry whose target differs from its original, one file at a
/// time. Renames already done stay in place if a later one fails; the error
/// lists them.
///
/// An entry runs as soon as its target is free. Only a rename cycle forces a
/// file under a temporary name, and at most one file is parked at any moment.
pub fn apply_presented(
    entries: &[PresentedRename],
    label: &str,
    progress: &dyn ProgressReporter,
) -> Result<ApplyResult, ApplyError> {
    let pending: Vec<&PresentedRename> =
        entries.iter().filter(|e| e.original != e.target).collect();
    let unchanged = entries.len() - pending.len();
    if pending.is_empty() {
        return Ok(ApplyResult {
            applied: 0,
            unchanged,
            completed: Vec::new(),
        });
    }

    validate_pending(entries, &pending)?;

    let total = pending.len();
    let occupant: HashMap<&Path, usize> = pending
        .iter()
        .enumerate()
        .map(|(index, e)| (e.original.as_path(), index))
        .collect();
    let mut vacated = vec![false; total];
    let mut done = vec![false; total];
    let mut parked: Option<(usize, PathBuf)> = None;

    progress.on_phase_start(label, total);
    let mut completed = Vec::with_capacity(total);
    while completed.len() < total {
        let ready = (0..total)
            .find(|&i| !done[i] && blocker(&occupant, &vacated, &pending[i].target).is_none());

        let Some(index) = ready else {
            let index = cycle_member(&pending, &occupant, &vacated, &done);
            let original = pending[index].original.as_path();
            let temp = temp_path_for(original, index);
            if let Err(source) = fs::rename(original, &temp) {
                return Err(ApplyError::Rename {
                    from: original.to_path_buf(),
                    to: temp,
                    completed,
                    stranded: stranded(&pending, parked.as_ref()),
                    source,
                });
            }
            debug!(original = %original.display(), temp = %temp.display(), "parked");
            vacated[index] = true;
            parked = Some((index, temp));
            continue;
        };

        let entry = pending[index];
        let source_path = match &parked {
            Some((parked_index, temp)) if *parked_index == index => temp.as_path(),
            _ => entry.original.as_path(),
        };
        if let Err(source) = fs::rename(source_path, &entry.target) {
            return Err(ApplyError::Rename {
                from: entry.original.clone(),
                to: entry.target.clone(),
                completed,
                stranded: stranded(&pending, parked.as_ref()),
                source,
            });
        }
        debug!(from = %entry.original.display(), to = %entry.target.display(), "renamed");
        if matches!(&parked, Some((parked_index, _)) if *parked_index == index) {
            parked = None;
        }
        vacated[index] = true;
        done[index] = true;
        completed.push(CompletedRename {
            from: entry.original.clone(),
            to: entry.target.clone(),
        });
        progress.on_item_done(completed.len(), total);
    }
    progress.on_phase_complete(label, total);

    info!(applied = completed.len(), unchanged, "{label} finished");
    Ok(ApplyResult {
        applied: completed.len(),
        unchanged,
        completed,
    })
}

/// The pending entry whose original still sits on `target`, if any.
fn blocker(occupant: &HashMap<&Path, usize>, vacated: &[bool], target: &Path) -> Option<usize> {
    occupant.get(target).copied().filter(|&i| !vacated[i])
}

/// Follows "target is held by" links from the first unfinished entry until one
/// repeats. Only called when every unfinished entry is blocked, so the walk
/// always ends on a cycle.
fn cycle_member(
    pending: &[&PresentedRename],
    occupant: &HashMap<&Path, usize>,
    vacated: &[bool],
    done: &[bool],
) -> usize {
    let mut current = done.iter().position(|d| !d).unwrap_or(0);
    let mut seen = HashSet::new();
    while seen.insert(current) {
        match blocker(occupant, vacated, &pending[current].target) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

fn stranded(
    pending: &[&PresentedRename],
    parked: Option<&(usize, PathBuf)>,
) -> Vec<CompletedRename> {
    parked
        .map(|(index, temp)| CompletedRename {
            from: pending[*index].original.clone(),
            to: temp.clone(),
        })
        .into_iter()
        .collect()
}

fn validate_pending(
    entries: &[PresentedRename],
    pending: &[&PresentedRename],
) -> Result<(), ApplyError> {
    let mut seen_targets = HashSet::<&Path>::new();
    for entry in entries {
        if !seen_targets.insert(entry.target.as_path()) {
            return Err(conflict(entry, "duplicate target in plan"));
        }
    }

    let moving_originals: HashSet<&Path> =
        pending.iter().map(|e| e.original.as_path()).collect();
    for entry in pending {
        if fs::symlink_metadata(&entry.target).is_ok()
            && !moving_originals.contains(entry.target.as_path())
        {
            return Err(conflict(entry, "target already exists"));
        }
    }
    Ok(())
}

fn conflict(entry: &PresentedRename, reason: &'static str) -> ApplyError {
    ApplyError::Conflict {
        original: entry.original.clone(),
        target: entry.target.clone(),
        reason,
    }
}

fn temp_path_for(original_path: &Path, index: usize) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let parent = original_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = original_path
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    parent.join(format!("{TEMP_PREFIX}{now}_{index}_{file_name}"))
}
