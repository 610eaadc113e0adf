use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::dates::{extract_date, DateRule};

static DASHED_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(20\d{2}(?:0[1-9]|1[0-2])(?:0[1-9]|[12]\d|3[01]))-").unwrap()
});
static COMPACT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(20\d{2}(?:0[1-9]|1[0-2])(?:0[1-9]|[12]\d|3[01]))(?:[^\d-]|$)").unwrap()
});

/// Date (if any) and the descriptive text left over from one title fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTitle {
    pub date: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, Copy)]
enum TitleRule {
    /// `20251025-标题`
    DashedPrefix,
    /// `20251025标题`
    CompactPrefix,
    /// A date anywhere in the fragment; the matched text is cut out.
    Embedded(DateRule),
    /// Whatever the extraction cascade finds, then a positional strip.
    Extracted,
}

// Prefix dates are authoritative over anything embedded later in the fragment.
const TITLE_RULES: [TitleRule; 7] = [
    TitleRule::DashedPrefix,
    TitleRule::CompactPrefix,
    TitleRule::Embedded(DateRule::Chinese),
    TitleRule::Embedded(DateRule::Dashed),
    TitleRule::Embedded(DateRule::Dotted),
    TitleRule::Embedded(DateRule::LastModified),
    TitleRule::Extracted,
];

// Forms tried when stripping after a cascade hit, first match only.
const STRIP_ORDER: [DateRule; 3] = [DateRule::Compact, DateRule::Dashed, DateRule::Dotted];

impl TitleRule {
    fn apply(self, fragment: &str) -> Option<NormalizedTitle> {
        match self {
            TitleRule::DashedPrefix => {
                let caps = DASHED_PREFIX_RE.captures(fragment)?;
                let whole = caps.get(0)?;
                Some(dated(&caps[1], &fragment[whole.end()..]))
            }
            TitleRule::CompactPrefix => {
                let date = COMPACT_PREFIX_RE.captures(fragment)?.get(1)?;
                Some(dated(date.as_str(), &fragment[date.end()..]))
            }
            TitleRule::Embedded(rule) => {
                let m = rule.find(fragment)?;
                Some(dated(&m.date, &cut(fragment, m.range)))
            }
            TitleRule::Extracted => {
                let date = extract_date(fragment)?;
                let title = STRIP_ORDER
                    .iter()
                    .find_map(|rule| rule.find(fragment))
                    .map(|m| cut(fragment, m.range))
                    .unwrap_or_else(|| fragment.to_string());
                Some(dated(&date, &title))
            }
        }
    }
}

fn dated(date: &str, title: &str) -> NormalizedTitle {
    NormalizedTitle {
        date: Some(date.to_string()),
        title: title.trim().to_string(),
    }
}

fn cut(text: &str, range: Range<usize>) -> String {
    format!("{}{}", &text[..range.start], &text[range.end..])
}

/// Separate an embedded date from one title fragment.
pub fn normalize_title(fragment: &str) -> NormalizedTitle {
    let fragment = fragment.trim();
    TITLE_RULES
        .iter()
        .find_map(|rule| rule.apply(fragment))
        .unwrap_or_else(|| NormalizedTitle {
            date: None,
            title: fragment.to_string(),
        })
}
