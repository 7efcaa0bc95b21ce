//! Merging client placeholders with backend history records.
//!
//! The merge is keyed by `task_id`: placeholders come first, then the
//! backend records, and for each key the first entry is kept unless a
//! later one is confirmed (non-negative id) while the kept one is still a
//! placeholder. In that case the confirmed record takes the placeholder's
//! slot, so the list does not reshuffle when a task is confirmed.

use std::collections::HashMap;

use crate::history::HistoryItem;

/// Merge `placeholders` (only items with a negative id are considered)
/// with `confirmed` backend records.
///
/// The result holds at most one item per `task_id`, prefers confirmed
/// records, and keeps placeholders the backend has not listed yet.
pub fn reconcile<'a, I>(placeholders: I, confirmed: Vec<HistoryItem>) -> Vec<HistoryItem>
where
    I: IntoIterator<Item = &'a HistoryItem>,
{
    let pending = placeholders
        .into_iter()
        .filter(|item| item.is_placeholder())
        .cloned();

    let mut merged: Vec<HistoryItem> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for item in pending.chain(confirmed) {
        match slots.get(&item.task_id) {
            None => {
                slots.insert(item.task_id.clone(), merged.len());
                merged.push(item);
            }
            Some(&slot) => {
                if merged[slot].is_placeholder() && !item.is_placeholder() {
                    merged[slot] = item;
                }
            }
        }
    }

    merged
}
