//! Coalescing covered intervals

use crate::models::{PageBound, PageInterval};

/// Merge intervals of one scope into the minimal disjoint set
///
/// Intervals that overlap or touch under the adjacency rule are combined.
/// The result is sorted ascending by start. Merging an already minimal set
/// returns it unchanged, and input order does not matter.
pub fn merge_intervals(mut intervals: Vec<PageInterval>) -> Vec<PageInterval> {
    intervals.sort_by(|a, b| {
        a.min_bound()
            .cmp(&b.min_bound())
            .then_with(|| a.max_bound().cmp(&b.max_bound()))
            .then_with(|| a.min_id.cmp(&b.min_id))
            .then_with(|| a.max_id.cmp(&b.max_id))
    });

    let mut merged: Vec<PageInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(running) if running.touches(&interval) => {
                debug_assert_eq!(running.scope, interval.scope, "merging intervals across scopes");
                absorb(running, interval);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Extend `running` with `next`, which starts at or after it
fn absorb(running: &mut PageInterval, next: PageInterval) {
    let (next_min, next_max) = (next.min_bound(), next.max_bound());
    let (min, min_id) = pick_bound(
        running.min_bound(),
        running.min_id.take(),
        next_min,
        next.min_id,
        |a, b| a < b,
    );
    let (max, max_id) = pick_bound(
        running.max_bound(),
        running.max_id.take(),
        next_max,
        next.max_id,
        |a, b| a > b,
    );

    running.min_value = min.value;
    running.min_order = min.order;
    running.min_id = min_id;
    running.max_value = max.value;
    running.max_order = max.order;
    running.max_id = max_id;
}

/// The more extreme of two bounds keeps its id; on a tie the id survives only
/// if both sides agree on it
fn pick_bound(
    a: PageBound,
    a_id: Option<String>,
    b: PageBound,
    b_id: Option<String>,
    more_extreme: impl Fn(PageBound, PageBound) -> bool,
) -> (PageBound, Option<String>) {
    if more_extreme(a, b) {
        (a, a_id)
    } else if more_extreme(b, a) {
        (b, b_id)
    } else if a_id == b_id {
        (a, a_id)
    } else {
        (a, None)
    }
}
