use chrono::{DateTime, Duration, Utc};

use crate::models::{ContentItem, Frame};

/// Window used when the caller gives a start but no end.
pub const DEFAULT_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Keep items inside the display window.
///
/// With an explicit `end` the range is inclusive on both ends. Without one the
/// window is `[start, start + 5min)`. Output keeps input order; callers re-sort.
pub fn filter_to_range(
    items: &[ContentItem],
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Vec<ContentItem> {
    filter_to_window(items, start, end, Duration::milliseconds(DEFAULT_WINDOW_MS))
}

/// Same as [`filter_to_range`] with a configurable default window.
pub fn filter_to_window(
    items: &[ContentItem],
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    default_window: Duration,
) -> Vec<ContentItem> {
    match end {
        Some(end) => items
            .iter()
            .filter(|item| item.timestamp >= start && item.timestamp <= end)
            .cloned()
            .collect(),
        None => {
            // past the last representable instant the window is open-ended
            let window_end = start.checked_add_signed(default_window);
            items
                .iter()
                .filter(|item| item.timestamp >= start && window_end.map_or(true, |end| item.timestamp < end))
                .cloned()
                .collect()
        }
    }
}

/// Stable sort by timestamp, then fill frameless items with the last frame seen.
///
/// Leading items with no earlier frame stay frameless. The input is not touched.
pub fn sort_and_fill_frames(items: &[ContentItem]) -> Vec<ContentItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| item.timestamp);

    let mut last_frame: Option<Frame> = None;
    for item in &mut sorted {
        match &item.frame {
            Some(frame) => last_frame = Some(frame.clone()),
            None => item.frame = last_frame.clone(),
        }
    }

    sorted
}
