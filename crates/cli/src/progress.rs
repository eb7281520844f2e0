use exif_renamer_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;

const BAR_TEMPLATE: &str = "{msg} {percent:>3}% [{bar:40.cyan/dim}] {pos}/{len} ({eta})";

/// One indicatif bar per phase: extraction, then one per renamed batch.
#[derive(Default)]
pub struct CliReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_phase_start(&self, label: &str, total: usize) {
        self.finish_bar();
        if total == 0 {
            return;
        }
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb.set_message(label.to_string());
        *self.bar.borrow_mut() = Some(pb);
    }

    fn on_item_done(&self, done: usize, _total: usize) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.set_position(done as u64);
        }
    }

    fn on_phase_complete(&self, label: &str, total: usize) {
        self.finish_bar();
        if total > 0 {
            eprintln!("{}: {} files", label, total);
        }
    }
}
