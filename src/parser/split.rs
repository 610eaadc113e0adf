use std::sync::LazyLock;

use regex::Regex;

use super::markers::{scan_markers, Marker};
use super::title::normalize_title;
use crate::config::BlankLinePolicy;

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n(?:[ \t\r]*\n)+").unwrap());

/// One note cut out of an export document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub date: String,
    /// `true` when no fragment carried a date and the document date was used.
    pub date_is_fallback: bool,
    pub title: String,
    pub body: String,
    /// First bracket fragment exactly as it appeared in the marker.
    pub source_title: Option<String>,
}

/// Split `text` into entries, one per title marker, in document order.
///
/// `fallback_date` (the document's modification date) is used for entries
/// whose fragments carry no recognizable date.
pub fn split_document(text: &str, fallback_date: &str, blank_lines: BlankLinePolicy) -> Vec<Entry> {
    let markers = scan_markers(text);

    markers
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            let body_end = markers.get(i + 1).map_or(text.len(), |next| next.start);
            let (date, date_is_fallback, title) = resolve_heading(&marker.fragments, fallback_date);
            Entry {
                date,
                date_is_fallback,
                title,
                body: extract_body(text, marker, body_end, blank_lines),
                source_title: marker.fragments.first().cloned(),
            }
        })
        .collect()
}

/// Pick (date, from-fallback, title) for one marker's fragments.
fn resolve_heading(fragments: &[String], fallback_date: &str) -> (String, bool, String) {
    let Some(first) = fragments.first() else {
        return (fallback_date.to_string(), true, String::new());
    };

    let primary = normalize_title(first);
    if let Some(date) = primary.date {
        return (date, false, primary.title);
    }

    // Title stays the first fragment; the date may come from elsewhere.
    let title = primary.title;

    if let Some(date) = fragments[1..].iter().find_map(|f| normalize_title(f).date) {
        return (date, false, title);
    }

    if fragments.len() > 1 {
        if let Some(date) = normalize_title(&fragments.join(" ")).date {
            return (date, false, title);
        }
    }

    (fallback_date.to_string(), true, title)
}

fn extract_body(text: &str, marker: &Marker, end: usize, blank_lines: BlankLinePolicy) -> String {
    let body = text[marker.end..end].trim();
    match blank_lines {
        BlankLinePolicy::Keep => body.to_string(),
        BlankLinePolicy::Collapse => BLANK_RUN_RE.replace_all(body, "\n\n").into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "20240101";

    fn split(text: &str) -> Vec<Entry> {
        split_document(text, FALLBACK, BlankLinePolicy::Keep)
    }

    #[test]
    fn no_markers() {
        assert!(split("只是一些文字\n没有标题").is_empty());
        assert!(split("").is_empty());
    }

    #[test]
    fn bodies_between_markers() {
        let entries = split("###标题###[A] \nline1\n\n###标题###[B] \nline2");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].body, "line1");
        assert_eq!(entries[1].body, "line2");
    }

    #[test]
    fn text_before_first_marker_is_dropped() {
        let entries = split("# 导出\n\n###标题###[A]\n正文");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body, "正文");
    }

    #[test]
    fn prefix_date_in_first_fragment() {
        let e = &split("###标题###[20251025-标题A] \n正文")[0];
        assert_eq!((e.date.as_str(), e.title.as_str()), ("20251025", "标题A"));
        assert!(!e.date_is_fallback);
    }

    #[test]
    fn date_from_second_fragment() {
        let e = &split("###标题###[标题B][最后修改时间20220216]\n正文")[0];
        assert_eq!((e.date.as_str(), e.title.as_str()), ("20220216", "标题B"));
    }

    #[test]
    fn first_dated_later_fragment_wins() {
        let e = &split("###标题###[标题C][无][2023-04-05][最后修改时间20240101]\n正文")[0];
        assert_eq!(e.date, "20230405");
        assert_eq!(e.title, "标题C");
    }

    #[test]
    fn chinese_date_in_title() {
        let e = &split("###标题###[2025年10月25日随笔]\n正文")[0];
        assert_eq!((e.date.as_str(), e.title.as_str()), ("20251025", "随笔"));
    }

    #[test]
    fn falls_back_to_document_date() {
        let e = &split("###标题###[没有日期][也没有]\n正文")[0];
        assert_eq!(e.date, FALLBACK);
        assert!(e.date_is_fallback);
        assert_eq!(e.title, "没有日期");
    }

    #[test]
    fn zero_fragments_use_fallback_and_empty_title() {
        assert_eq!(
            resolve_heading(&[], FALLBACK),
            (FALLBACK.to_string(), true, String::new())
        );
    }

    #[test]
    fn source_titles_round_trip() {
        let text = "###标题###[20251025-一] \na\n###标题###[二][最后修改时间20220216]\nb\n###标题###[三]\nc";
        let firsts: Vec<String> = split(text).into_iter().filter_map(|e| e.source_title).collect();
        assert_eq!(firsts, vec!["20251025-一", "二", "三"]);
    }

    #[test]
    fn bodies_cover_document_without_overlap() {
        let text = "###标题###[A]\n  一\n二  \n\n###标题###[B]\n\n三\n";
        let entries = split(text);
        assert_eq!(entries[0].body, "一\n二");
        assert_eq!(entries[1].body, "三");
    }

    #[test]
    fn empty_body() {
        let entries = split("###标题###[A] \n\n###标题###[B] \n正文");
        assert_eq!(entries[0].body, "");
    }

    #[test]
    fn collapse_blank_runs() {
        let text = "###标题###[A]\n一\n\n\n  \n二\n\n三";
        let kept = split_document(text, FALLBACK, BlankLinePolicy::Keep);
        let collapsed = split_document(text, FALLBACK, BlankLinePolicy::Collapse);
        assert_eq!(kept[0].body, "一\n\n\n  \n二\n\n三");
        assert_eq!(collapsed[0].body, "一\n\n二\n\n三");
    }

    #[test]
    fn fixture_diary() {
        let text = std::fs::read_to_string("tests/fixtures/diary.txt").unwrap();
        let entries = split(&text);
        let heads: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.date.as_str(), e.title.as_str()))
            .collect();
        assert_eq!(
            heads,
            vec![
                ("20251025", "我的一天"),
                ("20220216", "统一授信会议纪要"),
                ("20250227", "案例评审记录"),
                ("20240307", "周报"),
                ("20251024", "随笔"),
                (FALLBACK, "无日期的想法"),
            ]
        );
        assert_eq!(entries[2].body, "");
        assert!(entries[0].body.starts_with("早上去跑步"));
        assert!(entries[5].body.ends_with("最后一行。"));
    }
}
