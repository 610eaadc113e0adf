use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;
use tracing::warn;

use crate::config::CollisionPolicy;
use crate::error::{NoteSplitError, Result};

pub const OUTPUT_EXTENSION: &str = "txt";

static ILLEGAL_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap());

/// `{date}-{title}` with path-hostile characters replaced by `_`, cut to
/// `max_len` characters (the last three being `...`) when too long.
pub fn sanitize_identifier(date: &str, title: &str, max_len: usize) -> String {
    let raw = format!("{}-{}", date, title);
    let cleaned = ILLEGAL_CHARS_RE.replace_all(&raw, "_");
    truncate_identifier(&cleaned, max_len)
}

fn truncate_identifier(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Last-modified date of `path` as `YYYYMMDD`, or today's date when the
/// filesystem cannot tell.
pub fn fallback_date(path: &Path) -> String {
    let modified = fs::metadata(path).and_then(|m| m.modified());
    let when: DateTime<Local> = match modified {
        Ok(t) => t.into(),
        Err(e) => {
            warn!("No modification time for {}: {}; using today", path.display(), e);
            Local::now()
        }
    };
    when.format("%Y%m%d").to_string()
}

/// File name chosen for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub file_name: String,
    /// Set when the identifier was already used earlier in this run.
    pub collided: bool,
}

/// Writes entry files into one directory, tracking names used in this run.
pub struct EntryWriter {
    dir: PathBuf,
    policy: CollisionPolicy,
    used: HashSet<String>,
}

impl EntryWriter {
    pub fn new(dir: impl Into<PathBuf>, policy: CollisionPolicy) -> Self {
        EntryWriter {
            dir: dir.into(),
            policy,
            used: HashSet::new(),
        }
    }

    /// Reserve a file name for `identifier` under the collision policy.
    pub fn claim(&mut self, identifier: &str) -> Claim {
        if self.used.insert(identifier.to_string()) {
            return Claim {
                file_name: file_name(identifier),
                collided: false,
            };
        }

        let stem = match self.policy {
            CollisionPolicy::Overwrite => identifier.to_string(),
            CollisionPolicy::Suffix => (2..)
                .map(|n| format!("{}-{}", identifier, n))
                .find(|candidate| self.used.insert(candidate.clone()))
                .unwrap_or_else(|| identifier.to_string()),
        };
        Claim {
            file_name: file_name(&stem),
            collided: true,
        }
    }

    /// Write `body` to `file_name` inside the output directory.
    pub fn write(&self, file_name: &str, body: &str) -> Result<PathBuf> {
        let path = self.dir.join(file_name);
        fs::write(&path, body).map_err(|e| NoteSplitError::io(&path, e))?;
        Ok(path)
    }
}

fn file_name(stem: &str) -> String {
    format!("{}.{}", stem, OUTPUT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::dates::is_canonical;

    #[test]
    fn replaces_illegal_characters() {
        assert_eq!(
            sanitize_identifier("20240101", r#"a\b/c:d*e?f"g<h>i|j"#, 200),
            "20240101-a_b_c_d_e_f_g_h_i_j"
        );
    }

    #[test]
    fn truncates_long_identifiers() {
        let title = "字".repeat(250 - 9);
        let id = sanitize_identifier("20240101", &title, 200);
        assert_eq!(id.chars().count(), 200);
        assert!(id.ends_with("..."));
        assert!(id.starts_with("20240101-字"));
    }

    #[test]
    fn keeps_identifier_at_limit() {
        let title = "a".repeat(200 - 9);
        let id = sanitize_identifier("20240101", &title, 200);
        assert_eq!(id.chars().count(), 200);
        assert!(!id.ends_with("..."));
    }

    #[test]
    fn empty_title() {
        assert_eq!(sanitize_identifier("20240101", "", 200), "20240101-");
    }

    #[test]
    fn fallback_date_of_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.txt");
        fs::write(&path, "x").unwrap();
        let date = fallback_date(&path);
        assert!(is_canonical(&date), "got {}", date);
    }

    #[test]
    fn fallback_date_never_fails() {
        let date = fallback_date(Path::new("/definitely/not/here.txt"));
        assert!(is_canonical(&date));
    }

    #[test]
    fn suffix_policy_numbers_repeats() {
        let mut w = EntryWriter::new("out", CollisionPolicy::Suffix);
        assert_eq!(w.claim("20240101-a").file_name, "20240101-a.txt");
        let second = w.claim("20240101-a");
        assert_eq!(second.file_name, "20240101-a-2.txt");
        assert!(second.collided);
        assert_eq!(w.claim("20240101-a").file_name, "20240101-a-3.txt");
    }

    #[test]
    fn suffix_skips_names_taken_naturally() {
        let mut w = EntryWriter::new("out", CollisionPolicy::Suffix);
        w.claim("x");
        w.claim("x-2");
        assert_eq!(w.claim("x").file_name, "x-3.txt");
    }

    #[test]
    fn overwrite_policy_reuses_name() {
        let mut w = EntryWriter::new("out", CollisionPolicy::Overwrite);
        w.claim("x");
        let again = w.claim("x");
        assert_eq!(again.file_name, "x.txt");
        assert!(again.collided);
    }

    #[test]
    fn write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let w = EntryWriter::new(dir.path().join("missing"), CollisionPolicy::Suffix);
        assert!(matches!(w.write("a.txt", "body"), Err(NoteSplitError::Io { .. })));
    }
}
