use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::models::{Annotation, ContentItem, Frame};
use crate::timeline::time::{from_epoch_millis, parse_timestamp};

/// One entry of the capture API's timeline response.
#[derive(Debug, Deserialize)]
pub struct JsonEntry {
    pub id: Option<serde_json::Value>,
    pub timestamp: Option<serde_json::Value>,
    pub source_id: Option<i64>,
    pub frame: Option<JsonFrame>,
    pub transcript: Option<JsonTranscript>,
    pub speaker_name: Option<String>,
    pub speaker_confidence: Option<f64>,
    pub annotations: Option<Vec<JsonAnnotation>>,
}

#[derive(Debug, Deserialize)]
pub struct JsonFrame {
    pub frame_id: Option<i64>,
    pub url: Option<String>,
    pub perceptual_hash: Option<String>,
    // Also accept a plain `hash`
    pub hash: Option<String>,
    pub source_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum JsonTranscript {
    Text(String),
    Record(JsonTranscriptRecord),
}

#[derive(Debug, Deserialize)]
pub struct JsonTranscriptRecord {
    pub text: Option<String>,
    pub speaker_name: Option<String>,
    pub speaker_confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct JsonAnnotation {
    pub annotation_id: Option<i64>,
    pub annotation_type: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Option<String>,
    pub created_by: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Parse a timeline response object or a bare array of entries.
///
/// Entries that fail to deserialize or carry no usable timestamp are skipped.
pub fn parse_json(content: &str) -> Result<Vec<ContentItem>> {
    let doc: serde_json::Value =
        serde_json::from_str(content).context("Failed to parse timeline JSON")?;

    let entries = match doc {
        serde_json::Value::Array(entries) => entries,
        serde_json::Value::Object(mut map) => match map.remove("entries") {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => bail!("Timeline JSON object has no \"entries\" array"),
        },
        _ => bail!("Expected a timeline response object or an array of entries"),
    };

    let mut items = Vec::with_capacity(entries.len());
    for (i, value) in entries.into_iter().enumerate() {
        let entry: JsonEntry = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping entry {i}: {e}");
                continue;
            }
        };
        if let Some(item) = entry_to_item(entry, i) {
            items.push(item);
        }
    }

    Ok(items)
}

fn entry_to_item(entry: JsonEntry, index: usize) -> Option<ContentItem> {
    let timestamp = match &entry.timestamp {
        Some(serde_json::Value::String(s)) => parse_timestamp(s).ok(),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|ms| from_epoch_millis(ms).ok()),
        _ => None,
    };
    let Some(timestamp) = timestamp else {
        warn!("Skipping entry {index}: missing or malformed timestamp {:?}", entry.timestamp);
        return None;
    };

    let id = match entry.id {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => uuid::Uuid::new_v4().to_string(),
    };

    let frame = entry.frame.map(|f| Frame {
        url: f
            .url
            .or_else(|| f.frame_id.map(|id| format!("/api/search?type=frame&frame_id={id}"))),
        hash: f.perceptual_hash.or(f.hash),
        source_id: f.source_id.or(entry.source_id),
    });

    let mut speaker_name = entry.speaker_name;
    let mut speaker_confidence = entry.speaker_confidence;
    let transcript = match entry.transcript {
        Some(JsonTranscript::Text(text)) => Some(text),
        Some(JsonTranscript::Record(record)) => {
            speaker_name = speaker_name.or(record.speaker_name);
            speaker_confidence = speaker_confidence.or(record.speaker_confidence);
            record.text
        }
        None => None,
    };

    let annotations = entry
        .annotations
        .unwrap_or_default()
        .into_iter()
        .map(|a| Annotation {
            annotation_id: a.annotation_id,
            annotation_type: a
                .annotation_type
                .or(a.kind)
                .unwrap_or_else(|| "custom".to_string()),
            content: a.content.unwrap_or_default(),
            created_by: a.created_by,
            metadata: a.metadata,
        })
        .collect();

    Some(ContentItem {
        id,
        timestamp,
        frame,
        transcript,
        speaker_name,
        speaker_confidence,
        annotations,
        source_id: entry.source_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const RESPONSE: &str = r#"{
        "type": "timeline",
        "count": 3,
        "entries": [
            {
                "timestamp": "2025-01-15T10:00:00",
                "source_id": 1,
                "scene_changed": false,
                "annotations": [],
                "frame": {
                    "frame_id": 42,
                    "timestamp": "2025-01-15T10:00:00",
                    "source_id": 1,
                    "perceptual_hash": "a1b2c3",
                    "similarity_score": 97.5
                }
            },
            {
                "timestamp": "2025-01-15T10:00:05",
                "source_id": 1,
                "annotations": [
                    {"annotation_id": 7, "annotation_type": "user_note", "content": "standup", "created_by": "user"}
                ],
                "transcript": {
                    "transcription_id": 9,
                    "text": "good morning",
                    "speaker_name": "Alice",
                    "speaker_confidence": 0.91
                }
            },
            {
                "timestamp": "not a time",
                "transcript": "dropped"
            }
        ],
        "pagination": {"limit": 100, "offset": 0, "has_more": false}
    }"#;

    #[test]
    fn test_parse_timeline_response() {
        let items = parse_json(RESPONSE).unwrap();
        assert_eq!(items.len(), 2);

        let frame = items[0].frame.as_ref().unwrap();
        assert_eq!(frame.hash.as_deref(), Some("a1b2c3"));
        assert_eq!(frame.url.as_deref(), Some("/api/search?type=frame&frame_id=42"));
        assert_eq!(items[0].timestamp, Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap());
        assert!(!items[0].id.is_empty());

        assert_eq!(items[1].transcript.as_deref(), Some("good morning"));
        assert_eq!(items[1].speaker_name.as_deref(), Some("Alice"));
        assert_eq!(items[1].speaker_confidence, Some(0.91));
        assert_eq!(items[1].annotations[0].annotation_type, "user_note");
        assert_eq!(items[1].annotations[0].annotation_id, Some(7));
    }

    #[test]
    fn test_parse_bare_array_with_short_forms() {
        let json = r#"[
            {"id": 5, "timestamp": 1736935200000, "frame": {"hash": "h1"}, "transcript": "a"},
            {"id": "x", "timestamp": "2025-01-15T10:01:00Z", "annotations": [{"type": "ai_summary", "content": "s"}]}
        ]"#;
        let items = parse_json(json).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "5");
        assert_eq!(items[0].frame_hash(), Some("h1"));
        assert_eq!(items[0].transcript.as_deref(), Some("a"));
        assert_eq!(items[1].id, "x");
        assert_eq!(items[1].annotations[0].annotation_type, "ai_summary");
    }

    #[test]
    fn test_skips_entries_with_wrong_shape() {
        let json = r#"[{"timestamp": "2025-01-15T10:00:00", "source_id": "nope"}, {"timestamp": "2025-01-15"}]"#;
        let items = parse_json(json).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_rejects_non_timeline_documents() {
        assert!(parse_json("{\"type\": \"timeline\"}").is_err());
        assert!(parse_json("42").is_err());
        assert!(parse_json("{not json").is_err());
    }
}
