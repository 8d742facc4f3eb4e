use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A captured frame reference. `hash` is the perceptual hash used for content equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,
}

impl Frame {
    pub fn with_hash(hash: &str) -> Self {
        Frame {
            url: None,
            hash: Some(hash.to_string()),
            source_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_id: Option<i64>,
    #[serde(rename = "type")]
    pub annotation_type: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// One timestamped observation on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Frame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,
}

impl ContentItem {
    /// New empty item with a generated id.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        ContentItem {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            frame: None,
            transcript: None,
            speaker_name: None,
            speaker_confidence: None,
            annotations: Vec::new(),
            source_id: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn with_transcript(mut self, text: &str) -> Self {
        self.transcript = Some(text.to_string());
        self
    }

    pub fn with_annotation(mut self, annotation_type: &str, content: &str) -> Self {
        self.annotations.push(Annotation {
            annotation_id: None,
            annotation_type: annotation_type.to_string(),
            content: content.to_string(),
            created_by: None,
            metadata: None,
        });
        self
    }

    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }

    /// An empty transcript string counts as no transcript.
    pub fn has_transcript(&self) -> bool {
        self.transcript.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
    }

    pub fn frame_hash(&self) -> Option<&str> {
        self.frame.as_ref().and_then(|f| f.hash.as_deref())
    }

    pub fn epoch_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// A fixed slice of a caller-supplied `[start, end)` range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub has_frame: bool,
    pub has_transcript: bool,
    pub has_annotation: bool,
    pub data: Vec<ContentItem>,
}

/// A calendar-aligned bucket keyed by its absolute start epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeChunk {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub items: Vec<ContentItem>,
    pub has_frames: bool,
    pub has_transcripts: bool,
    pub has_annotations: bool,
    pub frame_count: usize,
    pub transcript_count: usize,
}

/// A maximal run of adjacent items with identical frame hash and transcript.
/// Indices are inclusive and point into the sorted, frame-filled item list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentGroup {
    pub start_index: usize,
    pub end_index: usize,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Frame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl ContentGroup {
    pub fn item_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}
