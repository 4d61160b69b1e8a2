//! Recording the range a fetched page covers

use anyhow::Result;
use log::debug;

use super::merge_intervals;
use crate::models::{
    AccountId, OrderDirection, PageBound, PageInterval, PageItem, PageItemType, PageKey, PageScope,
};
use crate::storage::{IntervalChanges, PageIntervalStore};

/// Interval covered by a page key and the items fetched for it
///
/// The side the page starts from is always covered up to the key's bound.
/// On the far side:
/// - a short page (fewer items than `key.size`) covers up to the key's bound,
///   since the source had nothing more in range;
/// - a full page covers only up to its last item, which also names the bound.
///
/// The short-page rule relies on the fetching side returning fewer items than
/// requested only at the true end of the range, never as a partial result.
/// `items` must be ordered in the key's direction and lie inside its range.
pub fn page_interval_for<I: PageItem>(scope: PageScope, key: &PageKey, items: &[I]) -> PageInterval {
    let (min, min_id, max, max_id) = covered_bounds(key, items);
    PageInterval::from_bounds(scope, min, min_id, max, max_id)
}

/// Bounds (with their ids) of the range a page claims, see [`page_interval_for`]
pub(crate) fn covered_bounds<I: PageItem>(
    key: &PageKey,
    items: &[I],
) -> (PageBound, Option<String>, PageBound, Option<String>) {
    debug_assert!(key.size > 0, "page key with size 0");
    debug_assert!(
        items.iter().all(|item| key.filter.contains(item.bound())),
        "page items outside of the key range"
    );

    let filter = &key.filter;
    let last = items.last().filter(|_| !key.is_short(items.len()));

    match (key.order_direction, last) {
        (_, None) => (
            filter.min_bound(),
            filter.min_id.clone(),
            filter.max_bound(),
            filter.max_id.clone(),
        ),
        (OrderDirection::Ascending, Some(last)) => (
            filter.min_bound(),
            filter.min_id.clone(),
            last.bound(),
            Some(last.id().to_string()),
        ),
        (OrderDirection::Descending, Some(last)) => (
            last.bound(),
            Some(last.id().to_string()),
            filter.max_bound(),
            filter.max_id.clone(),
        ),
    }
}

/// Changes that fold `interval` into the `stored` intervals of its scope
///
/// Stored intervals consumed by the merge are deleted and merged results not
/// already stored are inserted. Planning the same interval against the
/// resulting state yields no changes.
pub fn plan_interval_update(stored: &[PageInterval], interval: PageInterval) -> IntervalChanges {
    let mut all = stored.to_vec();
    all.push(interval);
    let merged = merge_intervals(all);

    let deleted = stored
        .iter()
        .filter(|s| !merged.contains(*s))
        .cloned()
        .collect();
    let inserted = merged
        .into_iter()
        .filter(|m| !stored.contains(m))
        .collect();

    IntervalChanges { deleted, inserted }
}

/// Record a fetched page as covered
///
/// Computes the page's interval, merges it with the stored intervals of the
/// key's scope and replaces them, all inside one store transaction.
pub fn upsert_page_interval<I: PageItem>(
    store: &dyn PageIntervalStore,
    account_id: &AccountId,
    item_type: PageItemType,
    key: &PageKey,
    items: &[I],
) -> Result<IntervalChanges> {
    let scope = PageScope::for_key(account_id, item_type, key);
    let interval = page_interval_for(scope.clone(), key, items);
    debug!(
        "Page of {} {} items covers [{}, {}] in label {}",
        items.len(),
        item_type.as_str(),
        interval.min_bound(),
        interval.max_bound(),
        scope.label_id.as_str()
    );

    let changes = store.transact(&scope, &mut |stored| {
        plan_interval_update(stored, interval.clone())
    })?;

    if !changes.is_empty() {
        debug!(
            "Replaced {} page intervals with {} in label {}",
            changes.deleted.len(),
            changes.inserted.len(),
            scope.label_id.as_str()
        );
    }
    Ok(changes)
}
