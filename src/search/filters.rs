use crate::models::ContentItem;

/// Filters that can be applied to item searches.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub speaker: Option<String>,
    pub source_id: Option<i64>,
    pub annotation_type: Option<String>,
}

impl Filters {
    /// Speaker is a case-insensitive substring match; the others are exact.
    pub fn matches(&self, item: &ContentItem) -> bool {
        if let Some(ref speaker) = self.speaker {
            let wanted = speaker.to_lowercase();
            let hit = item
                .speaker_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&wanted));
            if !hit {
                return false;
            }
        }

        if let Some(source_id) = self.source_id {
            if item.source_id != Some(source_id) {
                return false;
            }
        }

        if let Some(ref annotation_type) = self.annotation_type {
            if !item
                .annotations
                .iter()
                .any(|a| &a.annotation_type == annotation_type)
            {
                return false;
            }
        }

        true
    }
}
