use std::sync::LazyLock;

use regex::Regex;

/// Literal token that opens every note in an export.
pub const MARKER_TOKEN: &str = "###标题###";

// Fragments may be separated by spaces or tabs but never span lines.
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"###标题###((?:[ \t]*\[[^\]\n]*\])+)\s*").unwrap());
static FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]\n]*)\]").unwrap());

/// One title marker: where it starts, where the body starts, and its fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub start: usize,
    pub end: usize,
    pub fragments: Vec<String>,
}

/// All markers in document order.
pub fn scan_markers(text: &str) -> Vec<Marker> {
    MARKER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let fragments = FRAGMENT_RE
                .captures_iter(&caps[1])
                .map(|f| f[1].to_string())
                .collect();
            Some(Marker {
                start: whole.start(),
                end: whole.end(),
                fragments,
            })
        })
        .collect()
}

/// Bracket contents of a single title line, e.g. `###标题###[a] [b]` → `["a", "b"]`.
pub fn fragments_of(line: &str) -> Vec<String> {
    line.find(MARKER_TOKEN)
        .map(|pos| &line[pos + MARKER_TOKEN.len()..])
        .map(|rest| {
            FRAGMENT_RE
                .captures_iter(rest)
                .map(|f| f[1].to_string())
                .collect()
        })
        .unwrap_or_default()
}
