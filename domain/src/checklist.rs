//! Turns extracted checklist items into task board checklist entries.

use meeting_ai::types::task_board::ChecklistEntry;
use meeting_ai::CheckListItem;
use uuid::Uuid;

/// One unchecked entry per item, in order, each keyed by a fresh random id.
pub fn format(items: &[CheckListItem]) -> Vec<ChecklistEntry> {
    items
        .iter()
        .map(|item| ChecklistEntry {
            id: Uuid::new_v4().to_string(),
            title: item.title.clone(),
            is_checked: false,
        })
        .collect()
}
