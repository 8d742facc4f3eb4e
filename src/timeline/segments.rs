use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::models::{ContentItem, Segment};

/// Split `[start, end)` into fixed-duration segments; the last one is clipped to `end`.
///
/// Items are bucketed half-open per segment. The range filter upstream keeps
/// an item stamped exactly at `end`, but no segment contains it.
pub fn build_segments(
    items: &[ContentItem],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    segment_duration: Duration,
) -> Vec<Segment> {
    let segment_ms = segment_duration.num_milliseconds();
    if segment_ms <= 0 {
        warn!("Ignoring non-positive segment duration: {segment_ms}ms");
        return Vec::new();
    }

    let span_ms = (end - start).num_milliseconds();
    if span_ms <= 0 {
        debug!("Empty segment range: {start} .. {end}");
        return Vec::new();
    }

    let segment_count = (span_ms + segment_ms - 1) / segment_ms;

    let segments: Vec<Segment> = (0..segment_count)
        .map(|i| {
            let seg_start = start + Duration::milliseconds(i * segment_ms);
            let seg_end = seg_start
                .checked_add_signed(segment_duration)
                .map_or(end, |seg_end| seg_end.min(end));

            let data: Vec<ContentItem> = items
                .iter()
                .filter(|item| item.timestamp >= seg_start && item.timestamp < seg_end)
                .cloned()
                .collect();

            Segment {
                start: seg_start,
                end: seg_end,
                has_frame: data.iter().any(ContentItem::has_frame),
                has_transcript: data.iter().any(ContentItem::has_transcript),
                has_annotation: data.iter().any(ContentItem::has_annotations),
                data,
            }
        })
        .collect();

    debug!("Built {} segments of {segment_ms}ms", segments.len());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Frame;
    use crate::timeline::filter::filter_to_range;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, h, m, 0).unwrap()
    }

    #[test]
    fn test_ten_minutes_in_five_minute_segments() {
        let segments = build_segments(&[], at(10, 0), at(10, 10), Duration::minutes(5));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, at(10, 0));
        assert_eq!(segments[0].end, at(10, 5));
        assert_eq!(segments[1].start, at(10, 5));
        assert_eq!(segments[1].end, at(10, 10));
    }

    #[test]
    fn test_last_segment_is_clipped() {
        let segments = build_segments(&[], at(10, 0), at(10, 12), Duration::minutes(5));
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].start, at(10, 10));
        assert_eq!(segments[2].end, at(10, 12));
    }

    #[test]
    fn test_degenerate_range_yields_nothing() {
        assert!(build_segments(&[], at(10, 0), at(10, 0), Duration::minutes(5)).is_empty());
        assert!(build_segments(&[], at(11, 0), at(10, 0), Duration::minutes(5)).is_empty());
        assert!(build_segments(&[], at(10, 0), at(11, 0), Duration::zero()).is_empty());
    }

    #[test]
    fn test_range_ending_at_last_instant() {
        let end = DateTime::<Utc>::MAX_UTC;
        let start = end - Duration::minutes(1);
        let items = vec![ContentItem::new(start + Duration::seconds(30))];

        let segments = build_segments(&items, start, end, Duration::minutes(5));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, start);
        assert_eq!(segments[0].end, end);
        assert_eq!(segments[0].data.len(), 1);
    }

    #[test]
    fn test_flags_follow_contents() {
        let items = vec![
            ContentItem::new(at(10, 1)).with_frame(Frame::with_hash("h1")),
            ContentItem::new(at(10, 6)).with_transcript("hello"),
            ContentItem::new(at(10, 7)).with_transcript(""),
            ContentItem::new(at(10, 11)).with_annotation("user_note", "lunch"),
        ];
        let segments = build_segments(&items, at(10, 0), at(10, 15), Duration::minutes(5));

        assert!(segments[0].has_frame && !segments[0].has_transcript && !segments[0].has_annotation);
        assert!(!segments[1].has_frame && segments[1].has_transcript && !segments[1].has_annotation);
        assert_eq!(segments[1].data.len(), 2);
        assert!(!segments[2].has_frame && !segments[2].has_transcript && segments[2].has_annotation);
    }

    #[test]
    fn test_item_at_range_end_falls_outside_every_segment() {
        let items = vec![
            ContentItem::new(at(10, 0)).with_id("first"),
            ContentItem::new(at(10, 10)).with_id("at-end"),
        ];
        let in_range = filter_to_range(&items, at(10, 0), Some(at(10, 10)));
        assert_eq!(in_range.len(), 2);

        let segments = build_segments(&in_range, at(10, 0), at(10, 10), Duration::minutes(5));
        let bucketed: usize = segments.iter().map(|s| s.data.len()).sum();
        assert_eq!(bucketed, 1);
        assert!(segments.iter().all(|s| s.data.iter().all(|i| i.id != "at-end")));
    }
}
