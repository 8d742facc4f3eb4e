use crate::models::{ContentGroup, ContentItem};

/// Two adjacent items share a group when frame hash and transcript both match.
/// A missing hash equals a missing hash; annotations are not compared.
fn same_content(a: &ContentItem, b: &ContentItem) -> bool {
    a.frame_hash() == b.frame_hash() && a.transcript == b.transcript
}

fn open_group(index: usize, item: &ContentItem) -> ContentGroup {
    ContentGroup {
        start_index: index,
        end_index: index,
        timestamp: item.timestamp,
        frame: item.frame.clone(),
        transcript: item.transcript.clone(),
        annotations: item.annotations.clone(),
    }
}

/// Collapse runs of identical consecutive content into groups.
///
/// Expects items already sorted and frame-filled. Group ranges tile
/// `0..items.len()` exactly; an empty list yields no groups.
pub fn group_runs(items: &[ContentItem]) -> Vec<ContentGroup> {
    let mut groups = Vec::new();
    let mut current: Option<ContentGroup> = None;

    for (i, item) in items.iter().enumerate() {
        match &mut current {
            Some(group) if same_content(&items[i - 1], item) => {
                group.end_index = i;
            }
            _ => {
                if let Some(group) = current.take() {
                    groups.push(group);
                }
                current = Some(open_group(i, item));
            }
        }
    }

    if let Some(group) = current {
        groups.push(group);
    }

    groups
}

/// The items a group spans.
pub fn group_items<'a>(group: &ContentGroup, items: &'a [ContentItem]) -> &'a [ContentItem] {
    items.get(group.start_index..=group.end_index).unwrap_or(&[])
}

/// Selection state for a previous/next group viewer.
///
/// Rebuilding resets the selection to the first group. Stepping past either end
/// is a no-op.
#[derive(Debug, Clone, Default)]
pub struct GroupNavigator {
    groups: Vec<ContentGroup>,
    selected: usize,
}

impl GroupNavigator {
    pub fn new(groups: Vec<ContentGroup>) -> Self {
        GroupNavigator { groups, selected: 0 }
    }

    pub fn from_items(items: &[ContentItem]) -> Self {
        Self::new(group_runs(items))
    }

    pub fn rebuild(&mut self, groups: Vec<ContentGroup>) {
        self.groups = groups;
        self.selected = 0;
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn current(&self) -> Option<&ContentGroup> {
        self.groups.get(self.selected)
    }

    /// Returns whether the selection moved.
    pub fn step_forward(&mut self) -> bool {
        if self.selected + 1 < self.groups.len() {
            self.selected += 1;
            true
        } else {
            false
        }
    }

    /// Returns whether the selection moved.
    pub fn step_back(&mut self) -> bool {
        if self.selected > 0 {
            self.selected -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `index`, clamped to the last group.
    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.groups.len().saturating_sub(1));
    }

    pub fn is_first(&self) -> bool {
        self.selected == 0
    }

    pub fn is_last(&self) -> bool {
        self.selected + 1 >= self.groups.len()
    }
}
