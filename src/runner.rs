use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::config::Settings;
use crate::error::{NoteSplitError, Result};
use crate::output::{fallback_date, sanitize_identifier, EntryWriter};
use crate::parser::dates::is_canonical;
use crate::parser::split_document;
use crate::sink::RunSink;

/// Outcome of one split run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitReport {
    pub markers: usize,
    pub written: usize,
    pub failed: usize,
    pub collisions: usize,
    /// Entries whose date came from the fallback instead of their title.
    pub undated: usize,
    pub output_dir: PathBuf,
    /// File names written, in document order.
    pub files: Vec<String>,
}

/// Directory used when none is given: `output_dir_name` next to the input.
pub fn default_output_dir(input: &Path, settings: &Settings) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(&settings.output_dir_name)
}

/// Split `input` into one file per note under `output_dir`.
///
/// A missing input is fatal. A document without markers is a valid empty
/// result and writes nothing. A failed write skips that entry only.
pub fn run_split(
    input: &Path,
    output_dir: Option<&Path>,
    settings: &Settings,
    sink: &mut dyn RunSink,
) -> Result<SplitReport> {
    if !input.exists() {
        return Err(NoteSplitError::MissingInput(input.to_path_buf()));
    }
    let fallback = match &settings.fallback_date {
        Some(date) if is_canonical(date) => date.clone(),
        Some(date) => return Err(NoteSplitError::InvalidDate(date.clone())),
        None => fallback_date(input),
    };
    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(input, settings));
    sink.started(input, &output_dir);

    let text = fs::read_to_string(input).map_err(|e| NoteSplitError::io(input, e))?;
    let entries = split_document(&text, &fallback, settings.blank_lines);
    let total = entries.len();
    sink.markers_found(total);

    let mut report = SplitReport {
        markers: total,
        output_dir: output_dir.clone(),
        ..Default::default()
    };
    if entries.is_empty() {
        sink.finished(&report);
        return Ok(report);
    }

    fs::create_dir_all(&output_dir).map_err(|e| NoteSplitError::io(&output_dir, e))?;
    let mut writer = EntryWriter::new(&output_dir, settings.collision);

    for (i, entry) in entries.iter().enumerate() {
        if entry.date_is_fallback {
            report.undated += 1;
            debug!(
                "No date in [{}], using {}",
                entry.source_title.as_deref().unwrap_or_default(),
                fallback
            );
        }
        let identifier = sanitize_identifier(&entry.date, &entry.title, settings.max_identifier_len);
        let claim = writer.claim(&identifier);
        if claim.collided {
            report.collisions += 1;
            sink.collision(&identifier, &claim.file_name);
        }

        match writer.write(&claim.file_name, &entry.body) {
            Ok(_) => {
                report.written += 1;
                sink.entry_written(i, total, &claim.file_name);
                report.files.push(claim.file_name);
            }
            Err(e) => {
                report.failed += 1;
                sink.entry_failed(&claim.file_name, &e);
            }
        }
    }

    sink.finished(&report);
    Ok(report)
}
