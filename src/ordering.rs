//! Reconciles a reordered list coming from the presentation layer back into
//! persisted order ranks.
//!
//! Two entry points exist. [`reorder_by_ids`] takes store ids and is what the
//! terminal UI uses. [`reorder_from_display`] accepts the rendered display
//! lines instead and resolves them by name, which cannot tell apart two entries
//! with the same name and divider flag.

use anyhow::Result;

use crate::db::Store;
use crate::models::{Category, ContentItem, Subject};

/// Map each display line onto an item of `items`.
///
/// A line resolves to the first item not already claimed whose name and divider
/// flag match. Lines that resolve to nothing are dropped.
pub fn resolve_display_order<S: AsRef<str>>(
    items: &[ContentItem],
    display_lines: &[S],
) -> Vec<ContentItem> {
    let mut claimed = vec![false; items.len()];
    let mut resolved = Vec::with_capacity(display_lines.len());

    for line in display_lines {
        let (name, is_divider) = ContentItem::parse_display_line(line.as_ref());
        let hit = items
            .iter()
            .enumerate()
            .find(|(idx, item)| !claimed[*idx] && item.is_divider == is_divider && item.name == name);

        match hit {
            Some((idx, item)) => {
                claimed[idx] = true;
                resolved.push(item.clone());
            }
            None => tracing::debug!(line = line.as_ref(), "dropping unresolved display line"),
        }
    }

    resolved
}

/// Map each id onto an item of `items`, dropping ids that are unknown or
/// repeated.
pub fn resolve_id_order(items: &[ContentItem], ids: &[i64]) -> Vec<ContentItem> {
    let mut resolved: Vec<ContentItem> = Vec::with_capacity(ids.len());
    for &id in ids {
        if resolved.iter().any(|item| item.id == Some(id)) {
            continue;
        }
        match items.iter().find(|item| item.id == Some(id)) {
            Some(item) => resolved.push(item.clone()),
            None => tracing::debug!(id, "dropping unknown content id"),
        }
    }
    resolved
}

/// Return `items` with the entry at `from` moved to `to`. Out-of-range
/// positions leave the order untouched; `to` is clamped to the last slot.
pub fn move_item(items: &[ContentItem], from: usize, to: usize) -> Vec<ContentItem> {
    let mut reordered = items.to_vec();
    if from >= reordered.len() {
        return reordered;
    }
    let to = to.min(reordered.len() - 1);
    let item = reordered.remove(from);
    reordered.insert(to, item);
    reordered
}

/// Resolve `display_lines` against the subject's current list for `category`
/// and persist the result.
pub fn reorder_from_display<S: AsRef<str>>(
    store: &Store,
    subject: &mut Subject,
    category: Category,
    display_lines: &[S],
) -> Result<()> {
    let resolved = resolve_display_order(subject.content.get(category), display_lines);
    store.reorder_content(subject, category, &resolved)
}

/// Resolve `ids` against the subject's current list for `category` and
/// persist the result.
pub fn reorder_by_ids(
    store: &Store,
    subject: &mut Subject,
    category: Category,
    ids: &[i64],
) -> Result<()> {
    let resolved = resolve_id_order(subject.content.get(category), ids);
    store.reorder_content(subject, category, &resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: i64, item: ContentItem) -> ContentItem {
        ContentItem {
            id: Some(id),
            order_rank: id,
            ..item
        }
    }

    fn sample() -> Vec<ContentItem> {
        vec![
            stored(1, ContentItem::new(Category::Document, "a.pdf", "/a.pdf")),
            stored(2, ContentItem::divider(Category::Document, "")),
            stored(3, ContentItem::new(Category::Document, "b.pdf", "/b.pdf")),
            stored(4, ContentItem::divider(Category::Document, "")),
        ]
    }

    fn ids(items: &[ContentItem]) -> Vec<i64> {
        items.iter().filter_map(|i| i.id).collect()
    }

    #[test]
    fn display_lines_resolve_in_given_order() {
        let items = sample();
        let lines: Vec<String> = [2, 0, 3, 1].iter().map(|&i| items[i].display_line()).collect();
        let resolved = resolve_display_order(&items, &lines);
        // Both dividers render identically, so they come back in list order.
        assert_eq!(ids(&resolved), vec![3, 1, 2, 4]);
    }

    #[test]
    fn same_named_dividers_are_claimed_once_each() {
        let items = sample();
        let banner = items[1].display_line();
        let resolved = resolve_display_order(&items, &[banner.clone(), banner.clone(), banner]);
        assert_eq!(ids(&resolved), vec![2, 4]);
    }

    #[test]
    fn divider_flag_must_match() {
        let items = vec![stored(1, ContentItem::new(Category::Video, "Div", "/v/div.mp4"))];
        let banner = ContentItem::divider(Category::Video, "Div").display_line();
        assert!(resolve_display_order(&items, &[banner]).is_empty());
    }

    #[test]
    fn unknown_lines_are_dropped() {
        let items = sample();
        let resolved = resolve_display_order(&items, &["ghost.pdf | /ghost.pdf", "b.pdf | /b.pdf"]);
        assert_eq!(ids(&resolved), vec![3]);
    }

    #[test]
    fn id_resolution_skips_unknown_and_repeated() {
        let items = sample();
        let resolved = resolve_id_order(&items, &[4, 99, 1, 4, 2]);
        assert_eq!(ids(&resolved), vec![4, 1, 2]);
    }

    #[test]
    fn move_item_shifts_neighbours() {
        let items = sample();
        assert_eq!(ids(&move_item(&items, 0, 2)), vec![2, 3, 1, 4]);
        assert_eq!(ids(&move_item(&items, 3, 0)), vec![4, 1, 2, 3]);
        assert_eq!(ids(&move_item(&items, 1, 10)), vec![1, 3, 4, 2]);
        assert_eq!(ids(&move_item(&items, 7, 0)), vec![1, 2, 3, 4]);
    }
}
