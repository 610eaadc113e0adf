//! Progress and logging collaborator for one split run.
//!
//! The run reports what it does through a [`RunSink`] instead of printing.
//! The console implementation owns its progress bar, so nothing outlives the
//! run.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::error::NoteSplitError;
use crate::runner::SplitReport;

pub trait RunSink {
    fn started(&mut self, input: &Path, output_dir: &Path);
    fn markers_found(&mut self, total: usize);
    fn entry_written(&mut self, index: usize, total: usize, file_name: &str);
    fn entry_failed(&mut self, file_name: &str, error: &NoteSplitError);
    /// `file_name` is where the entry actually went (renamed or overwritten).
    fn collision(&mut self, identifier: &str, file_name: &str);
    fn finished(&mut self, report: &SplitReport);
}

/// Renders a run as tracing events plus a progress bar on stderr.
#[derive(Default)]
pub struct ConsoleSink {
    pb: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    // Keep log lines from tearing through the bar.
    fn log(&self, f: impl FnOnce()) {
        match &self.pb {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }
}

impl RunSink for ConsoleSink {
    fn started(&mut self, input: &Path, output_dir: &Path) {
        info!("Splitting {}", input.display());
        info!("Output directory: {}", output_dir.display());
    }

    fn markers_found(&mut self, total: usize) {
        if total == 0 {
            warn!("No title markers (###标题###) found");
            return;
        }
        info!("Found {} title markers", total);
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")
            .map(|s| s.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        self.pb = Some(pb);
    }

    fn entry_written(&mut self, index: usize, total: usize, file_name: &str) {
        self.log(|| debug!("Wrote {}/{}: {}", index + 1, total, file_name));
        if let Some(pb) = &self.pb {
            pb.inc(1);
        }
    }

    fn entry_failed(&mut self, file_name: &str, error: &NoteSplitError) {
        self.log(|| warn!("Failed to write {}: {}", file_name, error));
        if let Some(pb) = &self.pb {
            pb.inc(1);
        }
    }

    fn collision(&mut self, identifier: &str, file_name: &str) {
        self.log(|| warn!("Duplicate identifier {}, writing to {}", identifier, file_name));
    }

    fn finished(&mut self, report: &SplitReport) {
        if let Some(pb) = self.pb.take() {
            pb.finish_and_clear();
        }
        info!(
            "Wrote {} of {} entries ({} failed, {} collisions)",
            report.written, report.markers, report.failed, report.collisions
        );
    }
}

/// Keeps every callback as a line of text, for assertions.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<String>,
}

#[cfg(test)]
impl RunSink for RecordingSink {
    fn started(&mut self, _input: &Path, _output_dir: &Path) {
        self.events.push("started".into());
    }

    fn markers_found(&mut self, total: usize) {
        self.events.push(format!("markers {}", total));
    }

    fn entry_written(&mut self, index: usize, total: usize, file_name: &str) {
        self.events.push(format!("written {}/{} {}", index + 1, total, file_name));
    }

    fn entry_failed(&mut self, file_name: &str, _error: &NoteSplitError) {
        self.events.push(format!("failed {}", file_name));
    }

    fn collision(&mut self, identifier: &str, file_name: &str) {
        self.events.push(format!("collision {} -> {}", identifier, file_name));
    }

    fn finished(&mut self, report: &SplitReport) {
        self.events.push(format!("finished {}/{}", report.written, report.markers));
    }
}
