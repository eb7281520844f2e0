/// Per-file progress for the long-running phases (timestamp extraction and
/// renaming). All methods default to no-ops.
pub trait ProgressReporter {
    fn on_phase_start(&self, _label: &str, _total: usize) {}
    fn on_item_done(&self, _done: usize, _total: usize) {}
    fn on_phase_complete(&self, _label: &str, _total: usize) {}
}

/// Reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

#[cfg(test)]
pub(crate) mod tests {
    use super::ProgressReporter;
    use std::cell::RefCell;

    /// Records every callback so tests can assert on the sequence.
    #[derive(Default)]
    pub(crate) struct RecordingReporter {
        pub events: RefCell<Vec<String>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn on_phase_start(&self, label: &str, total: usize) {
            self.events.borrow_mut().push(format!("start {label} {total}"));
        }

        fn on_item_done(&self, done: usize, total: usize) {
            self.events.borrow_mut().push(format!("{done}/{total}"));
        }

        fn on_phase_complete(&self, label: &str, total: usize) {
            self.events.borrow_mut().push(format!("done {label} {total}"));
        }
    }
}
