//! Terminal progress for multi-sheet runs.

use indicatif::{ProgressBar, ProgressStyle};

use sheetdiff_core::{ProgressObserver, SheetOutcome};

const TEMPLATE: &str = "{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar advanced once per compared sheet.
pub struct SheetProgress {
    bar: ProgressBar,
}

impl SheetProgress {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        Self {
            bar: ProgressBar::new(0).with_style(style),
        }
    }

    /// A progress bar that never draws.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for SheetProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for SheetProgress {
    fn sheet_started(&self, index: usize, total: usize, sheet: &str) {
        self.bar.set_length(total as u64);
        self.bar.set_position(index as u64);
        self.bar.set_message(sheet.to_string());
    }

    fn sheet_finished(&self, index: usize, _total: usize, outcome: &SheetOutcome) {
        self.bar.set_position(index as u64 + 1);
        if !outcome.is_ok() {
            self.bar.println(format!("sheet '{}' failed", outcome.sheet));
        }
    }
}
