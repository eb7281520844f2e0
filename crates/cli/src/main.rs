mod logging;
mod progress;
mod prompt;

use anyhow::{Context, Result};
use clap::Parser;
use exif_renamer_core::{
    apply_presented, generate_plan, load_config, present, render_line, AppConfig, ApplyError,
    PlanOptions, PresentedRename, ProgressReporter, SystemClock, RENAME_IMAGES_LABEL,
    RENAME_VIDEOS_LABEL,
};
use progress::CliReporter;
use prompt::prompt_confirm;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

#[derive(Debug, Parser)]
#[command(name = "exif-renamer")]
#[command(about = "Renames photos and videos after the moment they were captured")]
struct Cli {
    /// Source directory for files renaming. Current directory by default
    #[arg(short = 'i', long = "input_folder", value_name = "INPUT_DIRECTORY")]
    input: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
enum RunOutcome {
    NothingToRename,
    Declined,
    Renamed { applied: usize, unchanged: usize },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = config_or_default(load_config());
    if !config.color {
        colored::control::set_override(false);
    }
    logging::init_logger(&config);
    if let Some(err) = config_error {
        warn!("using default settings: {err:#}");
    }

    let input = match cli.input {
        Some(path) => path,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };

    let reporter = CliReporter::new();
    let mut confirm = |default: bool| prompt_confirm("Confirm renaming", default);
    match execute(&input, &config, &reporter, &mut confirm)? {
        RunOutcome::NothingToRename => eprintln!("Nothing to rename."),
        RunOutcome::Declined => eprintln!("No files were renamed."),
        RunOutcome::Renamed { applied, unchanged } => {
            eprintln!("Renamed {applied} files ({unchanged} already named).")
        }
    }
    Ok(())
}

/// A missing or broken config never stops a run; the error is handed back so
/// it can be logged once logging is up.
fn config_or_default(loaded: Result<AppConfig>) -> (AppConfig, Option<anyhow::Error>) {
    match loaded {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

/// Plans, prints, asks and applies. `confirm` receives the default answer and
/// is only called when at least one file would change.
fn execute(
    input: &Path,
    config: &AppConfig,
    progress: &dyn ProgressReporter,
    confirm: &mut dyn FnMut(bool) -> io::Result<bool>,
) -> Result<RunOutcome> {
    let plan = generate_plan(
        &PlanOptions {
            input: input.to_path_buf(),
        },
        SystemClock,
        progress,
    )?;

    let images = present(&plan.images);
    let videos = present(&plan.videos);
    for item in images.iter().chain(&videos) {
        println!("{}", render_line(item, config.color));
    }

    if plan.pending_renames() == 0 {
        return Ok(RunOutcome::NothingToRename);
    }

    if !confirm(config.confirm_default)? {
        return Ok(RunOutcome::Declined);
    }

    let mut applied = 0;
    for (entries, label) in [(&images, RENAME_IMAGES_LABEL), (&videos, RENAME_VIDEOS_LABEL)] {
        applied += apply_batch(entries, label, progress)?;
    }
    Ok(RunOutcome::Renamed {
        applied,
        unchanged: images.len() + videos.len() - applied,
    })
}

fn apply_batch(
    entries: &[PresentedRename],
    label: &str,
    progress: &dyn ProgressReporter,
) -> Result<usize> {
    match apply_presented(entries, label, progress) {
        Ok(result) => Ok(result.applied),
        Err(err) => {
            if let ApplyError::Rename {
                completed,
                stranded,
                ..
            } = &err
            {
                for done in completed {
                    eprintln!("renamed: {} -> {}", done.from.display(), done.to.display());
                }
                for parked in stranded {
                    error!(
                        original = %parked.from.display(),
                        temp = %parked.to.display(),
                        "file left under a temporary name"
                    );
                }
            }
            Err(err).with_context(|| format!("{label} stopped"))
        }
    }
}
