//! Terminal progress for a scan run.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use nsgeo_application::ports::ScanProgress;
use nsgeo_domain::ScanResult;

const TEMPLATE: &str = "{spinner:.green} Scanning [{bar:15.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

pub struct ScanProgressBar {
    bar: ProgressBar,
}

impl ScanProgressBar {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    /// A bar that draws nothing, for non-interactive runs.
    pub fn hidden(total: u64) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden());
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ScanProgress for ScanProgressBar {
    fn on_result(&self, result: &ScanResult) {
        self.bar
            .set_message(format!("{} [{}ms]", result.fqdn, result.elapsed_ms));
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
