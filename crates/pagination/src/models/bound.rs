//! A point in the mailbox ordering space

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in the `(time, order)` key space of a mailbox view
///
/// `value` is the primary sort field (e.g. a timestamp) and `order` the
/// tie-break used when several items share the same value. Bounds compare
/// lexicographically: by value first, then by order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageBound {
    pub value: i64,
    pub order: i64,
}

impl PageBound {
    /// Lowest possible position; an interval starting here is open-ended
    pub const MIN: PageBound = PageBound::new(i64::MIN, i64::MIN);

    /// Highest possible position; an interval ending here is open-ended
    pub const MAX: PageBound = PageBound::new(i64::MAX, i64::MAX);

    pub const fn new(value: i64, order: i64) -> Self {
        Self { value, order }
    }

    /// Bound where the order equals the value, as for items whose order is
    /// derived from their timestamp
    pub const fn at(value: i64) -> Self {
        Self::new(value, value)
    }

    /// Adjacency rule: no item can sit strictly after `self` and strictly
    /// before `other`.
    ///
    /// True when `other` lies before `self`, or shares its value with an order
    /// at most one step after `self.order`. This is the only place where the
    /// "zero items in between" arithmetic lives. It relates two interval
    /// bounds; an item may still sit on a point one step outside an interval.
    pub fn reaches(self, other: PageBound) -> bool {
        match other.value.cmp(&self.value) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Equal => other.order <= self.order.saturating_add(1),
            std::cmp::Ordering::Greater => false,
        }
    }
}

impl fmt::Display for PageBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.value, self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_value_then_order() {
        assert!(PageBound::new(1000, 5) < PageBound::new(1001, 0));
        assert!(PageBound::new(1000, 5) < PageBound::new(1000, 6));
        assert!(PageBound::MIN < PageBound::at(0));
        assert!(PageBound::at(0) < PageBound::MAX);
    }

    #[test]
    fn test_reaches_overlapping_values() {
        assert!(PageBound::at(2000).reaches(PageBound::at(1500)));
        assert!(!PageBound::at(2000).reaches(PageBound::at(2100)));
    }

    #[test]
    fn test_reaches_same_value_uses_order_step() {
        let upper = PageBound::new(2000, 2001);
        assert!(upper.reaches(PageBound::new(2000, 2000)));
        assert!(upper.reaches(PageBound::new(2000, 2001)));
        assert!(upper.reaches(PageBound::new(2000, 2002)));
        assert!(!upper.reaches(PageBound::new(2000, 2003)));
    }

    #[test]
    fn test_reaches_saturates_at_max() {
        assert!(PageBound::MAX.reaches(PageBound::MAX));
        assert!(PageBound::MAX.reaches(PageBound::new(i64::MAX, i64::MIN)));
    }

    #[test]
    fn test_display() {
        assert_eq!(PageBound::new(10, 11).to_string(), "(10, 11)");
    }
}
