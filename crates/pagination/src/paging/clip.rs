//! Narrowing a page key to the part not yet covered

use anyhow::Result;
use log::debug;

use super::merge_intervals;
use crate::models::{AccountId, PageInterval, PageItemType, PageKey, PageScope};
use crate::storage::PageIntervalStore;

/// Shrink `key` so it starts and ends outside the covered `intervals`
///
/// Intervals are merged first, so touching intervals clip as one. A key bound
/// strictly inside a merged interval moves to that interval's far end: the
/// min to its max (taking `max_id`), the max to its min (taking `min_id`). A
/// bound merely adjacent to an interval is left alone, since an item may sit
/// on it. The returned key only drops ranges that are already in sync.
///
/// Returns `None` when one interval contains the whole key. Gaps in the
/// middle of the key are left in place.
pub fn clip_page_key(intervals: &[PageInterval], key: &PageKey) -> Option<PageKey> {
    let filter = &key.filter;
    let merged = merge_intervals(intervals.to_vec());

    let (mut min, mut min_id) = (filter.min_bound(), filter.min_id.clone());
    let (mut max, mut max_id) = (filter.max_bound(), filter.max_id.clone());

    if merged.iter().any(|i| i.contains(min) && i.contains(max)) {
        return None;
    }
    if let Some(interval) = merged.iter().find(|i| i.contains(min)) {
        min = interval.max_bound();
        min_id = interval.max_id.clone();
    }
    if let Some(interval) = merged.iter().find(|i| i.contains(max)) {
        max = interval.min_bound();
        max_id = interval.min_id.clone();
    }

    debug_assert!(min <= max, "clipped key [{min}, {max}] is inverted");
    Some(key.with_bounds(min, min_id, max, max_id))
}

/// Clip `key` against the intervals stored for its scope
pub fn get_clipped_page_key(
    store: &dyn PageIntervalStore,
    account_id: &AccountId,
    item_type: PageItemType,
    key: &PageKey,
) -> Result<Option<PageKey>> {
    let scope = PageScope::for_key(account_id, item_type, key);
    let intervals = store.get_all(&scope)?;
    let clipped = clip_page_key(&intervals, key);

    match &clipped {
        Some(clipped) if clipped != key => debug!(
            "Clipped {} key [{}, {}] to [{}, {}] in label {}",
            item_type.as_str(),
            key.filter.min_bound(),
            key.filter.max_bound(),
            clipped.filter.min_bound(),
            clipped.filter.max_bound(),
            scope.label_id.as_str()
        ),
        Some(_) => {}
        None => debug!(
            "{} key [{}, {}] is fully covered in label {}",
            item_type.as_str(),
            key.filter.min_bound(),
            key.filter.max_bound(),
            scope.label_id.as_str()
        ),
    }
    Ok(clipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderDirection, PageBound, PageFilter};
    use crate::paging::plan_interval_update;
    use crate::storage::InMemoryPageIntervalStore;

    fn scope() -> PageScope {
        PageScope::for_key(&AccountId::new("1"), PageItemType::Message, &PageKey::default())
    }

    fn interval(min: PageBound, max: PageBound) -> PageInterval {
        PageInterval::new(scope(), min, max).unwrap()
    }

    fn simple(min: i64, max: i64) -> PageInterval {
        interval(PageBound::at(min), PageBound::at(max))
    }

    fn key_over(min: PageBound, max: PageBound) -> PageKey {
        PageKey::new(
            PageFilter::with_range(min, max).unwrap(),
            OrderDirection::Ascending,
            PageKey::DEFAULT_SIZE,
        )
    }

    fn key(min: i64, max: i64) -> PageKey {
        key_over(PageBound::at(min), PageBound::at(max))
    }

    fn bounds(key: &PageKey) -> (PageBound, PageBound) {
        (key.filter.min_bound(), key.filter.max_bound())
    }

    #[test]
    fn test_no_intervals_keeps_key() {
        let key = key(0, 3000);
        assert_eq!(clip_page_key(&[], &key), Some(key));
    }

    #[test]
    fn test_disjoint_interval_keeps_key() {
        let key = key(0, 3000);
        assert_eq!(clip_page_key(&[simple(5000, 6000)], &key), Some(key));
    }

    #[test]
    fn test_interval_overlapping_min_advances_min() {
        let intervals = [interval(PageBound::MIN, PageBound::at(1000))];
        let clipped = clip_page_key(&intervals, &key_over(PageBound::at(0), PageBound::MAX)).unwrap();
        assert_eq!(bounds(&clipped), (PageBound::at(1000), PageBound::MAX));
    }

    #[test]
    fn test_interval_overlapping_max_retreats_max() {
        let intervals = [interval(PageBound::at(2000), PageBound::MAX)];
        let clipped = clip_page_key(&intervals, &key(0, 3000)).unwrap();
        assert_eq!(bounds(&clipped), (PageBound::at(0), PageBound::at(2000)));
    }

    #[test]
    fn test_both_sides_clipped() {
        let intervals = [
            interval(PageBound::MIN, PageBound::at(1000)),
            simple(2000, 3000),
        ];
        let clipped = clip_page_key(&intervals, &key(0, 3000)).unwrap();
        assert_eq!(bounds(&clipped), (PageBound::at(1000), PageBound::at(2000)));
    }

    #[test]
    fn test_min_and_max_in_same_interval() {
        let intervals = [
            interval(PageBound::MIN, PageBound::at(1000)),
            simple(2000, 3000),
        ];
        assert_eq!(clip_page_key(&intervals, &key(0, 1000)), None);
        assert_eq!(clip_page_key(&intervals, &key(2100, 2900)), None);
    }

    #[test]
    fn test_chained_intervals_are_followed() {
        let intervals = [
            simple(1000, 2000),
            interval(PageBound::new(2000, 2001), PageBound::at(3000)),
            simple(0, 1000),
        ];
        let clipped = clip_page_key(&intervals, &key(0, 5000)).unwrap();
        assert_eq!(bounds(&clipped), (PageBound::at(3000), PageBound::at(5000)));

        assert_eq!(clip_page_key(&intervals, &key(0, 3000)), None);
    }

    #[test]
    fn test_bound_one_order_step_outside_is_kept() {
        let intervals = [
            interval(PageBound::new(0, 1), PageBound::new(1000, 1001)),
            interval(PageBound::new(2000, 2001), PageBound::new(3000, 3001)),
        ];
        // An item may sit on (0, 0) or (3000, 3002)
        let key = key_over(PageBound::new(0, 0), PageBound::new(3000, 3002));
        assert_eq!(clip_page_key(&intervals, &key), Some(key));

        let key = key_over(PageBound::new(0, 1), PageBound::new(3000, 3001));
        let clipped = clip_page_key(&intervals, &key).unwrap();
        assert_eq!(
            bounds(&clipped),
            (PageBound::new(1000, 1001), PageBound::new(2000, 2001))
        );
    }

    #[test]
    fn test_max_just_past_interval_is_not_covered() {
        let intervals = [simple(0, 1000)];
        let key = key_over(PageBound::at(500), PageBound::new(1000, 1001));

        let clipped = clip_page_key(&intervals, &key).unwrap();
        assert_eq!(bounds(&clipped), (PageBound::at(1000), PageBound::new(1000, 1001)));
    }

    #[test]
    fn test_min_just_before_interval_is_not_clipped() {
        let intervals = [simple(1000, 2000)];
        let key = key_over(PageBound::new(1000, 999), PageBound::at(5000));
        assert_eq!(clip_page_key(&intervals, &key), Some(key));
    }

    #[test]
    fn test_touching_intervals_clip_as_one() {
        let intervals = [
            interval(PageBound::at(0), PageBound::new(1000, 1001)),
            interval(PageBound::new(1000, 1002), PageBound::at(2000)),
        ];
        let clipped = clip_page_key(&intervals, &key(500, 3000)).unwrap();
        assert_eq!(bounds(&clipped), (PageBound::at(2000), PageBound::at(3000)));

        assert_eq!(clip_page_key(&intervals, &key(500, 1500)), None);
    }

    #[test]
    fn test_bound_two_steps_away_is_not_covered() {
        let intervals = [interval(PageBound::new(0, 2), PageBound::at(1000))];
        let key = key_over(PageBound::new(0, 0), PageBound::at(5000));
        assert_eq!(clip_page_key(&intervals, &key), Some(key));
    }

    #[test]
    fn test_ids_follow_clipped_bounds() {
        let intervals = [
            simple(0, 1000).with_ids(Some("a".into()), Some("b".into())),
            simple(2000, 3000).with_ids(Some("c".into()), Some("d".into())),
        ];
        let clipped = clip_page_key(&intervals, &key(500, 2500)).unwrap();
        assert_eq!(clipped.filter.min_id.as_deref(), Some("b"));
        assert_eq!(clipped.filter.max_id.as_deref(), Some("c"));
    }

    #[test]
    fn test_clipped_key_keeps_filter_and_order() {
        let mut key = key(0, 3000);
        key.order_direction = OrderDirection::Descending;
        key.filter.keyword = "report".into();

        let clipped = clip_page_key(&[simple(0, 1000)], &key).unwrap();
        assert_eq!(clipped.order_direction, OrderDirection::Descending);
        assert_eq!(clipped.filter.keyword, "report");
        assert_eq!(clipped.size, key.size);
    }

    #[test]
    fn test_clipping_drops_only_covered_ranges() {
        let intervals = [
            simple(0, 1000),
            interval(PageBound::new(1000, 1001), PageBound::at(1500)),
            simple(2000, 2500),
            interval(PageBound::new(2500, 2502), PageBound::at(3000)),
            simple(4000, 6000),
        ];

        // Every stored bound, its neighbours one order step away, and a grid
        let mut points: Vec<PageBound> = intervals
            .iter()
            .flat_map(|i| [i.min_bound(), i.max_bound()])
            .flat_map(|b| (-1..=1).map(move |step| PageBound::new(b.value, b.order + step)))
            .collect();
        points.extend((-500..=6500).step_by(250).map(PageBound::at));
        points.sort();
        points.dedup();

        let covered = |bound: PageBound| intervals.iter().any(|i| i.contains(bound));

        for &key_min in &points {
            for &key_max in points.iter().filter(|&&b| b >= key_min) {
                let key = key_over(key_min, key_max);
                let clipped = clip_page_key(&intervals, &key);

                for &bound in &points {
                    let in_key = key.filter.contains(bound);
                    let in_clipped = clipped.as_ref().is_some_and(|c| c.filter.contains(bound));

                    // Everything uncovered in the key is still requested
                    if in_key && !covered(bound) {
                        assert!(in_clipped, "uncovered {bound} clipped from [{key_min}, {key_max}]");
                    }
                    // The clipped key never grows
                    if in_clipped {
                        assert!(in_key, "{bound} added to [{key_min}, {key_max}]");
                    }
                }
            }
        }
    }

    #[test]
    fn test_get_clipped_page_key_reads_its_scope() {
        let store = InMemoryPageIntervalStore::new();
        let account = AccountId::new("1");
        let stored = simple(0, 1000);
        store
            .transact(&scope(), &mut |s| plan_interval_update(s, stored.clone()))
            .unwrap();

        let key = key(0, 3000);
        let clipped = get_clipped_page_key(&store, &account, PageItemType::Message, &key)
            .unwrap()
            .unwrap();
        assert_eq!(clipped.filter.min_bound(), PageBound::at(1000));

        let unclipped =
            get_clipped_page_key(&store, &account, PageItemType::Conversation, &key).unwrap();
        assert_eq!(unclipped, Some(key));
    }
}
