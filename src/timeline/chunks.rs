use chrono::{DateTime, Duration};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::models::{ContentItem, TimeChunk};

/// 30 minutes.
pub const DEFAULT_CHUNK_MS: i64 = 30 * 60 * 1000;

/// Bucket start for an epoch timestamp, aligned to absolute multiples of `chunk_ms`.
pub fn chunk_start_millis(epoch_ms: i64, chunk_ms: i64) -> i64 {
    epoch_ms.div_euclid(chunk_ms) * chunk_ms
}

/// Stable id for a bucket, so expand/collapse state keyed on it survives regrouping.
pub fn chunk_id(chunk_start_ms: i64) -> String {
    format!("chunk-{chunk_start_ms}")
}

/// Bucket items into calendar-aligned chunks, independent of any query range.
///
/// Only populated buckets are emitted, ascending by start; items inside each
/// chunk are ascending by timestamp with ties in input order.
pub fn build_chunks(items: &[ContentItem], chunk_duration: Duration) -> Vec<TimeChunk> {
    let chunk_ms = chunk_duration.num_milliseconds();
    if chunk_ms <= 0 {
        warn!("Ignoring non-positive chunk duration: {chunk_ms}ms");
        return Vec::new();
    }

    let mut sorted: Vec<&ContentItem> = items.iter().collect();
    sorted.sort_by_key(|item| item.timestamp);

    let mut buckets: BTreeMap<i64, Vec<ContentItem>> = BTreeMap::new();
    for item in sorted {
        buckets
            .entry(chunk_start_millis(item.epoch_millis(), chunk_ms))
            .or_default()
            .push(item.clone());
    }

    let mut chunks = Vec::with_capacity(buckets.len());
    for (start_ms, items) in buckets {
        let Some(start_time) = DateTime::from_timestamp_millis(start_ms) else {
            warn!("Skipping chunk with out-of-range start: {start_ms}");
            continue;
        };
        let Some(end_time) = start_time.checked_add_signed(chunk_duration) else {
            warn!("Skipping chunk with out-of-range end: {start_ms} + {chunk_ms}ms");
            continue;
        };

        let mut frame_count = 0;
        let mut transcript_count = 0;
        let mut has_annotations = false;
        for item in &items {
            if item.has_frame() {
                frame_count += 1;
            }
            if item.has_transcript() {
                transcript_count += 1;
            }
            has_annotations |= item.has_annotations();
        }

        chunks.push(TimeChunk {
            id: chunk_id(start_ms),
            start_time,
            end_time,
            items,
            has_frames: frame_count > 0,
            has_transcripts: transcript_count > 0,
            has_annotations,
            frame_count,
            transcript_count,
        });
    }

    debug!("Grouped {} items into {} chunks", items.len(), chunks.len());
    chunks
}
