//! Builds an export document from `(title, body)` records handed over by the
//! page-scraping side. The result uses the same marker format that
//! [`crate::parser::split`] reads back.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{NoteSplitError, Result};
use crate::parser::markers::MARKER_TOKEN;

const DOCUMENT_HEADING: &str = "# 有道云笔记 - 日记内容汇总";
const SEPARATOR: &str = "==================================";

/// One scraped note, already reduced to plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Drop blank records and merge records sharing a title, keeping the longer
/// body at the position of the first occurrence.
pub fn prepare_records(records: Vec<NoteRecord>) -> Vec<NoteRecord> {
    let mut kept: Vec<NoteRecord> = Vec::with_capacity(records.len());
    let mut by_title: HashMap<String, usize> = HashMap::new();

    for record in records {
        let title = marker_safe(&record.title);
        let body = record.body.trim().to_string();
        if title.is_empty() && body.is_empty() {
            continue;
        }
        match by_title.get(&title).copied() {
            Some(idx) => {
                if body.chars().count() > kept[idx].body.chars().count() {
                    debug!("Replacing shorter duplicate of '{}'", title);
                    kept[idx].body = body;
                }
            }
            None => {
                by_title.insert(title.clone(), kept.len());
                kept.push(NoteRecord { title, body });
            }
        }
    }

    kept
}

// Brackets would end the marker fragment early; newlines would break the line.
fn marker_safe(title: &str) -> String {
    title
        .replace('[', "【")
        .replace(']', "】")
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

/// Render records as one export document.
pub fn compose_document(records: &[NoteRecord], exported_at: &DateTime<Local>) -> String {
    let mut doc = String::new();
    doc.push_str(DOCUMENT_HEADING);
    doc.push_str("\n\n");
    doc.push_str(&format!("导出时间: {}\n\n", exported_at.format("%Y-%m-%d %H:%M:%S")));
    doc.push_str(&format!("导出条目数: {}\n\n", records.len()));
    doc.push_str(SEPARATOR);
    doc.push_str("\n\n");

    for record in records {
        doc.push_str(&format!("{}[{}] \n\n", MARKER_TOKEN, record.title));
        doc.push_str(&record.body);
        doc.push_str("\n\n");
    }
    doc
}

/// `有道云笔记_{prefix}_{timestamp}.txt`
pub fn export_file_name(prefix: &str, at: &DateTime<Local>) -> String {
    format!("有道云笔记_{}_{}.txt", prefix, at.format("%Y-%m-%dT%H-%M-%S"))
}

pub fn load_records(path: &Path) -> Result<Vec<NoteRecord>> {
    if !path.exists() {
        return Err(NoteSplitError::MissingInput(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path).map_err(|e| NoteSplitError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|source| NoteSplitError::Records {
        path: path.to_path_buf(),
        source,
    })
}

/// Compose `records` and write them into `dir`. Returns the file path and
/// the number of notes written.
pub fn write_export(
    dir: &Path,
    prefix: &str,
    records: Vec<NoteRecord>,
    at: &DateTime<Local>,
) -> Result<(PathBuf, usize)> {
    let records = prepare_records(records);
    let doc = compose_document(&records, at);

    fs::create_dir_all(dir).map_err(|e| NoteSplitError::io(dir, e))?;
    let path = dir.join(export_file_name(prefix, at));
    fs::write(&path, &doc).map_err(|e| NoteSplitError::io(&path, e))?;
    info!("Exported {} notes ({} KB) to {}", records.len(), doc.len() / 1024, path.display());
    Ok((path, records.len()))
}
