use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

// Month 01-12, day 01-31. No calendar validation.
static LAST_MODIFIED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"最后修改时间(20\d{2})(0[1-9]|1[0-2])(0[1-9]|[12]\d|3[01])").unwrap()
});
static COMPACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(20\d{2})(0[1-9]|1[0-2])(0[1-9]|[12]\d|3[01])").unwrap());
static DASHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(20\d{2})-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])").unwrap());
static DOTTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(20\d{2})\.(0[1-9]|1[0-2])\.(0[1-9]|[12]\d|3[01])").unwrap());
static CHINESE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(20\d{2})年(0[1-9]|1[0-2])月(0[1-9]|[12]\d|3[01])日").unwrap());
static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^20\d{2}(0[1-9]|1[0-2])(0[1-9]|[12]\d|3[01])$").unwrap());

/// One recognizable date encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    /// `最后修改时间20251026`
    LastModified,
    /// `20251026`
    Compact,
    /// `2025-10-26`
    Dashed,
    /// `2025.10.26`
    Dotted,
    /// `2025年10月26日`
    Chinese,
}

/// Extraction order. The first rule that matches anywhere wins, even if a
/// later rule would match earlier in the text.
pub const EXTRACTION_ORDER: [DateRule; 5] = [
    DateRule::LastModified,
    DateRule::Compact,
    DateRule::Dashed,
    DateRule::Dotted,
    DateRule::Chinese,
];

/// A date found in text: the canonical `YYYYMMDD` and the byte range of the
/// whole match (label included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub date: String,
    pub range: Range<usize>,
}

impl DateRule {
    fn regex(self) -> &'static Regex {
        match self {
            DateRule::LastModified => &LAST_MODIFIED_RE,
            DateRule::Compact => &COMPACT_RE,
            DateRule::Dashed => &DASHED_RE,
            DateRule::Dotted => &DOTTED_RE,
            DateRule::Chinese => &CHINESE_RE,
        }
    }

    /// Leftmost occurrence of this encoding in `text`.
    pub fn find(self, text: &str) -> Option<DateMatch> {
        let caps = self.regex().captures(text)?;
        let whole = caps.get(0)?;
        Some(DateMatch {
            date: canonical(&caps),
            range: whole.range(),
        })
    }
}

fn canonical(caps: &Captures) -> String {
    format!("{}{}{}", &caps[1], &caps[2], &caps[3])
}

/// First date found by the prioritized cascade, with its span.
pub fn find_date(text: &str) -> Option<DateMatch> {
    EXTRACTION_ORDER.iter().find_map(|rule| rule.find(text))
}

/// First date found by the prioritized cascade, as `YYYYMMDD`.
pub fn extract_date(text: &str) -> Option<String> {
    find_date(text).map(|m| m.date)
}

/// `true` for `20YYMMDD` strings with a plausible month and day.
pub fn is_canonical(date: &str) -> bool {
    CANONICAL_RE.is_match(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_modified_label() {
        assert_eq!(extract_date("案例评审记录 最后修改时间20250227").as_deref(), Some("20250227"));
    }

    #[test]
    fn compact() {
        assert_eq!(extract_date("日记20251025晴").as_deref(), Some("20251025"));
    }

    #[test]
    fn dashed_dotted_chinese() {
        assert_eq!(extract_date("会议 2024-03-07").as_deref(), Some("20240307"));
        assert_eq!(extract_date("会议 2024.03.07").as_deref(), Some("20240307"));
        assert_eq!(extract_date("2024年03月07日 周四").as_deref(), Some("20240307"));
    }

    #[test]
    fn priority_beats_position() {
        // The dashed date comes first in the text, but the label rule ranks higher.
        let text = "2023-01-02 复盘 最后修改时间20240305";
        assert_eq!(extract_date(text).as_deref(), Some("20240305"));

        // Compact outranks Chinese even when the Chinese form is leftmost.
        let text = "2022年05月06日 补记 20230708";
        assert_eq!(extract_date(text).as_deref(), Some("20230708"));
    }

    #[test]
    fn leftmost_within_rule() {
        assert_eq!(extract_date("20240101 和 20250202").as_deref(), Some("20240101"));
    }

    #[test]
    fn rejects_invalid_month_and_day() {
        assert_eq!(extract_date("20241301"), None);
        assert_eq!(extract_date("2024-02-32"), None);
        assert_eq!(extract_date("最后修改时间20241399"), None);
        assert_eq!(extract_date("1999-01-01"), None);
    }

    #[test]
    fn no_date() {
        assert_eq!(extract_date("普通的标题"), None);
        assert_eq!(extract_date(""), None);
    }

    #[test]
    fn find_reports_span() {
        let text = "前缀最后修改时间20220216";
        let m = find_date(text).unwrap();
        assert_eq!(&text[m.range.clone()], "最后修改时间20220216");
        assert_eq!(m.date, "20220216");
    }

    #[test]
    fn canonical_check() {
        assert!(is_canonical("20240101"));
        assert!(!is_canonical("2024010"));
        assert!(!is_canonical("19990101"));
        assert!(!is_canonical("20241301"));
    }
}
