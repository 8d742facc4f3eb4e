pub mod filters;

use serde::Serialize;

use crate::models::ContentItem;
use filters::Filters;

const SNIPPET_CONTEXT: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Transcript,
    Annotation,
    /// Empty query: every filtered item matches.
    Any,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub item: ContentItem,
    pub matched_in: MatchField,
    pub snippet: String,
}

/// Case-insensitive search over transcript text and annotation content.
/// Results are in ascending timestamp order.
pub fn search_items(items: &[ContentItem], query: &str, filters: &Filters) -> Vec<SearchResult> {
    let needle = query.trim().to_lowercase();

    let mut results: Vec<SearchResult> = items
        .iter()
        .filter(|item| filters.matches(item))
        .filter_map(|item| match_item(item, &needle))
        .collect();

    results.sort_by_key(|r| r.item.timestamp);
    results
}

fn match_item(item: &ContentItem, needle: &str) -> Option<SearchResult> {
    if needle.is_empty() {
        let snippet = item.transcript.clone().unwrap_or_default();
        return Some(SearchResult {
            item: item.clone(),
            matched_in: MatchField::Any,
            snippet,
        });
    }

    if let Some(text) = item.transcript.as_deref() {
        if let Some(snippet) = snippet_around(text, needle) {
            return Some(SearchResult {
                item: item.clone(),
                matched_in: MatchField::Transcript,
                snippet,
            });
        }
    }

    item.annotations.iter().find_map(|a| {
        snippet_around(&a.content, needle).map(|snippet| SearchResult {
            item: item.clone(),
            matched_in: MatchField::Annotation,
            snippet,
        })
    })
}

/// Text around the first match of `needle` (already lowercased), or None.
fn snippet_around(text: &str, needle: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let pos = lower.find(needle)?;

    // Lowercasing can change byte lengths outside ASCII; fall back to the head.
    let (from, to) = if lower.len() == text.len() {
        (pos.saturating_sub(SNIPPET_CONTEXT), pos + needle.len() + SNIPPET_CONTEXT)
    } else {
        (0, SNIPPET_CONTEXT * 2)
    };
    let from = floor_boundary(text, from);
    let to = floor_boundary(text, to.min(text.len()));

    let mut snippet = String::new();
    if from > 0 {
        snippet.push_str("...");
    }
    snippet.push_str(text[from..to].trim());
    if to < text.len() {
        snippet.push_str("...");
    }
    Some(snippet.replace('\n', " "))
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn items() -> Vec<ContentItem> {
        let base = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        vec![
            ContentItem::new(base + Duration::minutes(2)).with_transcript("Let's review the Budget numbers"),
            ContentItem::new(base).with_transcript("budget kickoff"),
            ContentItem::new(base + Duration::minutes(1)).with_annotation("user_note", "ask about budget"),
            ContentItem::new(base + Duration::minutes(3)).with_transcript("unrelated"),
        ]
    }

    #[test]
    fn test_matches_transcripts_and_annotations_in_time_order() {
        let results = search_items(&items(), "BUDGET", &Filters::default());
        let fields: Vec<MatchField> = results.iter().map(|r| r.matched_in).collect();
        assert_eq!(
            fields,
            vec![MatchField::Transcript, MatchField::Annotation, MatchField::Transcript]
        );
        assert_eq!(results[0].snippet, "budget kickoff");
        assert!(results.windows(2).all(|w| w[0].item.timestamp <= w[1].item.timestamp));
    }

    #[test]
    fn test_empty_query_returns_everything_filtered() {
        let results = search_items(&items(), "  ", &Filters::default());
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.matched_in == MatchField::Any));
    }

    #[test]
    fn test_snippet_marks_truncation() {
        let text = format!("{} needle {}", "a".repeat(100), "b".repeat(100));
        let snippet = snippet_around(&text, "needle").unwrap();
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("needle"));
        assert!(snippet_around("nothing here", "needle").is_none());
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        let text = "日本語のテキストで予算について話しました。予算は重要です。";
        let snippet = snippet_around(text, "予算").unwrap();
        assert!(snippet.contains("予算"));
    }
}
