use serde::Serialize;

use crate::parser::markers::{fragments_of, MARKER_TOKEN};

/// Counts for the text between one title line and the next (or end of file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteStats {
    /// 1-based line number of the title line.
    pub line: usize,
    pub title: String,
    /// Characters in non-blank lines, each line trimmed first.
    pub characters: usize,
    pub blank_lines: usize,
    pub is_empty: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsReport {
    pub notes: Vec<NoteStats>,
}

impl StatsReport {
    pub fn total_titles(&self) -> usize {
        self.notes.len()
    }

    pub fn empty_notes(&self) -> impl Iterator<Item = &NoteStats> {
        self.notes.iter().filter(|n| n.is_empty)
    }

    /// Share of empty notes in percent; 0 when there are no notes.
    pub fn empty_ratio(&self) -> f64 {
        if self.notes.is_empty() {
            0.0
        } else {
            self.empty_notes().count() as f64 * 100.0 / self.notes.len() as f64
        }
    }
}

fn is_title_line(line: &str) -> bool {
    line.trim()
        .strip_prefix(MARKER_TOKEN)
        .is_some_and(|rest| rest.starts_with('['))
}

/// Line-based statistics for every note in an export.
pub fn collect_stats(text: &str) -> StatsReport {
    let mut notes: Vec<NoteStats> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if is_title_line(line) {
            notes.push(NoteStats {
                line: i + 1,
                title: fragments_of(line).join(" "),
                characters: 0,
                blank_lines: 0,
                is_empty: true,
            });
            continue;
        }
        // Lines before the first title belong to no note.
        let Some(note) = notes.last_mut() else {
            continue;
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            note.blank_lines += 1;
        } else {
            note.characters += trimmed.chars().count();
            note.is_empty = false;
        }
    }

    StatsReport { notes }
}

pub fn print_table(report: &StatsReport) {
    println!("Found {} titles\n", report.total_titles());
    println!(
        "{:>5} | {:<30} | {:>8} | {:>6} | {}",
        "Line", "Title", "Chars", "Blank", "Status"
    );
    println!("{}", "-".repeat(70));
    for n in &report.notes {
        let status = if n.is_empty { "EMPTY" } else { "ok" };
        println!(
            "{:>5} | {:<30} | {:>8} | {:>6} | {}",
            n.line,
            truncate(&n.title, 28),
            n.characters,
            n.blank_lines,
            status
        );
    }
    println!("{}", "-".repeat(70));

    let empty: Vec<_> = report.empty_notes().collect();
    println!("\n{} empty notes:", empty.len());
    for (i, n) in empty.iter().enumerate() {
        println!("  {}. '{}' (line {})", i + 1, n.title, n.line);
    }
    println!(
        "\nTitles: {} | Empty: {} ({:.1}%)",
        report.total_titles(),
        empty.len(),
        report.empty_ratio()
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
