use crate::planner::RenamePlan;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentedRename {
    pub original: PathBuf,
    pub target: PathBuf,
    pub collided: bool,
}

/// Projects `plan` into display order (ascending target path). Names and
/// collision flags are copied as-is.
pub fn present(plan: &RenamePlan) -> Vec<PresentedRename> {
    let mut out: Vec<PresentedRename> = plan
        .entries
        .iter()
        .map(|e| PresentedRename {
            original: e.original_path.clone(),
            target: e.target_path.clone(),
            collided: e.collided,
        })
        .collect();
    out.sort_by(|a, b| a.target.cmp(&b.target));
    out
}

pub fn render_line(item: &PresentedRename, styled: bool) -> String {
    let line = format!("{} -> {}", item.original.display(), item.target.display());
    if !styled {
        return line;
    }
    if item.collided {
        line.yellow().bold().to_string()
    } else {
        line.green().dimmed().to_string()
    }
}
