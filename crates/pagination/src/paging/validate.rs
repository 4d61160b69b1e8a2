//! Deciding whether a locally loaded page can be trusted

use anyhow::Result;
use log::trace;

use super::merge_intervals;
use super::update::covered_bounds;
use crate::models::{
    AccountId, OrderDirection, PageBound, PageInterval, PageItem, PageItemType, PageKey, PageScope,
};
use crate::storage::PageIntervalStore;

/// Whether `items`, read from the local cache for `key`, are a correct page
///
/// The answer is conservative: `true` only when the stored intervals prove
/// the page is complete, otherwise the caller should fetch remotely. A page
/// is valid when:
/// - items are strictly ordered in the key's direction and all match its
///   filter;
/// - the range the page claims (the whole key for a short page, the key's
///   start up to the last item for a full one) lies inside a single covered
///   interval, without the adjacency tolerance;
/// - every item recorded on a stored interval boundary inside that range is
///   among the items.
///
/// The boundary check only sees seams between stored intervals that were
/// never merged. [`upsert_page_interval`](super::upsert_page_interval) keeps
/// each scope merged, so ids inside a merged interval are gone and the check
/// does not prove that no locally cached item went missing.
pub fn validate_local_page<I: PageItem>(
    intervals: &[PageInterval],
    key: &PageKey,
    items: &[I],
) -> bool {
    if !is_ordered(key.order_direction, items) {
        trace!("Local page rejected: items out of {:?} order", key.order_direction);
        return false;
    }
    if let Some(item) = items.iter().find(|item| !key.filter.matches(*item)) {
        trace!("Local page rejected: item {} does not match the key", item.id());
        return false;
    }

    let (min, _, max, _) = covered_bounds(key, items);
    let merged = merge_intervals(intervals.to_vec());
    if !merged.iter().any(|i| i.contains(min) && i.contains(max)) {
        trace!("Local page rejected: [{min}, {max}] is not covered");
        return false;
    }

    if let Some(missing) = boundary_ids(intervals, min, max)
        .find(|id| !items.iter().any(|item| item.id() == *id))
    {
        trace!("Local page rejected: boundary item {missing} is missing");
        return false;
    }
    true
}

/// Validate a local page against the intervals stored for its scope
pub fn is_local_page_valid<I: PageItem>(
    store: &dyn PageIntervalStore,
    account_id: &AccountId,
    item_type: PageItemType,
    key: &PageKey,
    items: &[I],
) -> Result<bool> {
    let scope = PageScope::for_key(account_id, item_type, key);
    let intervals = store.get_all(&scope)?;
    Ok(validate_local_page(&intervals, key, items))
}

fn is_ordered<I: PageItem>(direction: OrderDirection, items: &[I]) -> bool {
    items.windows(2).all(|pair| match direction {
        OrderDirection::Ascending => pair[0].bound() < pair[1].bound(),
        OrderDirection::Descending => pair[0].bound() > pair[1].bound(),
    })
}

/// Ids recorded on interval bounds strictly between `min` and `max`
fn boundary_ids(
    intervals: &[PageInterval],
    min: PageBound,
    max: PageBound,
) -> impl Iterator<Item = &str> {
    intervals
        .iter()
        .flat_map(|i| [(i.min_bound(), &i.min_id), (i.max_bound(), &i.max_id)])
        .filter(move |(bound, _)| min < *bound && *bound < max)
        .filter_map(|(_, id)| id.as_deref())
}
