use chrono::Duration;
use unicode_width::UnicodeWidthStr;

use crate::models::{ContentGroup, ContentItem, Segment, TimeChunk};
use crate::search::{MatchField, SearchResult};
use crate::timeline::groups::{group_items, GroupNavigator};
use crate::timeline::time::{format_clock, format_range};

/// Format a span as `1h30m`, `5m`, `45s`.
pub fn format_span(span: Duration) -> String {
    let total = span.num_seconds().max(0);
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 && m > 0 {
        format!("{h}h{m:02}m")
    } else if h > 0 {
        format!("{h}h")
    } else if m > 0 && s > 0 {
        format!("{m}m{s:02}s")
    } else if m > 0 {
        format!("{m}m")
    } else {
        format!("{s}s")
    }
}

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// One character per segment: F frame, T transcript, A annotation, `.` empty.
pub fn segment_bar(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| {
            if s.has_frame {
                'F'
            } else if s.has_transcript {
                'T'
            } else if s.has_annotation {
                'A'
            } else {
                '.'
            }
        })
        .collect()
}

fn flags(frame: bool, transcript: bool, annotation: bool) -> String {
    format!(
        "{}{}{}",
        if frame { 'F' } else { '-' },
        if transcript { 'T' } else { '-' },
        if annotation { 'A' } else { '-' }
    )
}

fn item_line(item: &ContentItem) -> String {
    let mut parts = Vec::new();
    if let Some(hash) = item.frame_hash() {
        parts.push(format!("frame {hash}"));
    } else if item.has_frame() {
        parts.push("frame".to_string());
    }
    if let Some(text) = item.transcript.as_deref().filter(|t| !t.is_empty()) {
        let speaker = item
            .speaker_name
            .as_deref()
            .map(|s| format!("{s}: "))
            .unwrap_or_default();
        parts.push(format!("\"{speaker}{}\"", text.replace('\n', " ")));
    }
    for a in &item.annotations {
        parts.push(format!("[{}] {}", a.annotation_type, a.content.replace('\n', " ")));
    }
    if parts.is_empty() {
        parts.push("(empty)".to_string());
    }
    truncate(&parts.join("  "), 70)
}

/// Timeline bar view for `memtl segments`.
pub fn print_segments(segments: &[Segment], segment_duration: Duration) {
    if segments.is_empty() {
        println!("No segments in range.");
        return;
    }

    let first = &segments[0];
    let last = &segments[segments.len() - 1];
    println!(
        "{} segment{} {} ({} each):\n",
        segments.len(),
        plural(segments.len()),
        format_range(&first.start, &last.end),
        format_span(segment_duration)
    );
    println!("  [{}]\n", segment_bar(segments));

    println!("  {:<19} {:<5} {:>6}", "SEGMENT", "FLAGS", "ITEMS");
    println!("  {}", "-".repeat(32));
    for s in segments.iter().filter(|s| !s.data.is_empty()) {
        println!(
            "  {:<19} {:<5} {:>6}",
            format_range(&s.start, &s.end),
            flags(s.has_frame, s.has_transcript, s.has_annotation),
            s.data.len()
        );
    }
}

/// Chunk list for `memtl chunks`; `expand` lists each chunk's items.
pub fn print_chunks(chunks: &[TimeChunk], expand: bool) {
    if chunks.is_empty() {
        println!("No content in window.");
        return;
    }

    println!("{} chunk{}:\n", chunks.len(), plural(chunks.len()));

    for c in chunks {
        println!(
            "  {} {}  {} item{}, {} frame{}, {} transcript{}{}",
            if expand { "▾" } else { "▸" },
            format_range(&c.start_time, &c.end_time),
            c.items.len(),
            plural(c.items.len()),
            c.frame_count,
            plural(c.frame_count),
            c.transcript_count,
            plural(c.transcript_count),
            if c.has_annotations { ", annotated" } else { "" },
        );
        if expand {
            for item in &c.items {
                println!("      {}  {}", format_clock(&item.timestamp), item_line(item));
            }
            println!();
        }
    }
}

/// Group list for `memtl groups`.
pub fn print_groups(groups: &[ContentGroup]) {
    if groups.is_empty() {
        println!("No content in window.");
        return;
    }

    println!("{} group{}:\n", groups.len(), plural(groups.len()));
    for (i, g) in groups.iter().enumerate() {
        let hash = g.frame.as_ref().and_then(|f| f.hash.as_deref()).unwrap_or("-");
        let text = g.transcript.as_deref().unwrap_or("");
        println!(
            "  #{:<4} {}  {:>3} item{:<1}  frame {:<18} {}",
            i + 1,
            format_clock(&g.timestamp),
            g.item_count(),
            plural(g.item_count()),
            truncate(hash, 18),
            truncate(&format!("\"{text}\""), 40),
        );
    }
}

/// Single-group page for `memtl browse` and `memtl groups --index`.
pub fn print_group_page(nav: &GroupNavigator, items: &[ContentItem]) {
    let Some(group) = nav.current() else {
        println!("No content in window.");
        return;
    };

    println!(
        "Group {} / {}  {}{}{}",
        nav.selected_index() + 1,
        nav.len(),
        format_clock(&group.timestamp),
        if nav.is_first() { "  [first]" } else { "" },
        if nav.is_last() { "  [last]" } else { "" },
    );
    if let Some(frame) = &group.frame {
        println!("  Frame:      {}", frame.hash.as_deref().unwrap_or("(no hash)"));
        if let Some(url) = &frame.url {
            println!("  URL:        {url}");
        }
    }
    if let Some(text) = &group.transcript {
        println!("  Transcript: {}", truncate(&text.replace('\n', " "), 64));
    }
    for a in &group.annotations {
        println!("  [{}] {}", a.annotation_type, truncate(&a.content, 64));
    }

    let members = group_items(group, items);
    println!("  Items ({}):", members.len());
    for item in members {
        println!("    {}  {}", format_clock(&item.timestamp), item.id);
    }
}

pub fn print_search_results(results: &[SearchResult], query: &str) {
    if results.is_empty() {
        println!("No results for \"{query}\"");
        return;
    }

    println!("{} result{} for \"{}\":\n", results.len(), plural(results.len()), query);

    for r in results {
        let source = match r.matched_in {
            MatchField::Transcript | MatchField::Any => r.item.speaker_name.as_deref().unwrap_or("transcript"),
            MatchField::Annotation => "annotation",
        };
        println!(
            "  [{}] {}: {}",
            r.item.timestamp.format("%Y-%m-%d %H:%M:%S"),
            source,
            truncate(&r.snippet, 70)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(Duration::minutes(5)), "5m");
        assert_eq!(format_span(Duration::minutes(90)), "1h30m");
        assert_eq!(format_span(Duration::hours(24)), "24h");
        assert_eq!(format_span(Duration::seconds(45)), "45s");
        assert_eq!(format_span(Duration::seconds(125)), "2m05s");
    }

    #[test]
    fn test_segment_bar_priority() {
        let at = |m| Utc.with_ymd_and_hms(2025, 1, 15, 10, m, 0).unwrap();
        let seg = |m, f, t, a| Segment {
            start: at(m),
            end: at(m + 5),
            has_frame: f,
            has_transcript: t,
            has_annotation: a,
            data: Vec::new(),
        };
        let segments = vec![
            seg(0, true, true, true),
            seg(5, false, true, true),
            seg(10, false, false, true),
            seg(15, false, false, false),
        ];
        assert_eq!(segment_bar(&segments), "FTA.");
    }

    #[test]
    fn test_truncate_respects_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
        assert!(UnicodeWidthStr::width(truncate("日本語のテキストです", 9).as_str()) <= 9);
    }
}
