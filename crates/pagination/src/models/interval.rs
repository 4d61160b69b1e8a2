//! Covered intervals of a mailbox view

use serde::{Deserialize, Serialize};

use super::{AccountId, LabelId, OrderBy, PageBound, PageItemType, PageKey, ReadStatus};
use crate::error::PaginationError;

/// Partition key under which intervals are tracked independently
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageScope {
    pub account_id: AccountId,
    pub item_type: PageItemType,
    pub order_by: OrderBy,
    pub label_id: LabelId,
    pub keyword: String,
    pub read: ReadStatus,
}

impl PageScope {
    /// Scope of the mailbox view a page key queries
    pub fn for_key(account_id: &AccountId, item_type: PageItemType, key: &PageKey) -> Self {
        Self {
            account_id: account_id.clone(),
            item_type,
            order_by: key.order_by,
            label_id: key.filter.label_id.clone(),
            keyword: key.filter.keyword.clone(),
            read: key.filter.read,
        }
    }
}

/// A contiguous range of a mailbox view known to be in sync with the server
///
/// Both bounds are inclusive. `min_id`/`max_id` name the item sitting on a
/// bound when one was observed there; `None` means the bound came from a
/// query limit rather than an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageInterval {
    pub scope: PageScope,
    pub min_value: i64,
    pub max_value: i64,
    pub min_order: i64,
    pub max_order: i64,
    pub min_id: Option<String>,
    pub max_id: Option<String>,
}

impl PageInterval {
    /// Create an interval over `[min, max]` without boundary ids
    pub fn new(scope: PageScope, min: PageBound, max: PageBound) -> Result<Self, PaginationError> {
        if min > max {
            return Err(PaginationError::InvalidRange { min, max });
        }
        Ok(Self::from_bounds(scope, min, None, max, None))
    }

    /// Interval marking the whole view as synced
    pub fn complete(scope: PageScope) -> Self {
        Self::from_bounds(scope, PageBound::MIN, None, PageBound::MAX, None)
    }

    pub(crate) fn from_bounds(
        scope: PageScope,
        min: PageBound,
        min_id: Option<String>,
        max: PageBound,
        max_id: Option<String>,
    ) -> Self {
        debug_assert!(min <= max, "interval min {min} is after max {max}");
        Self {
            scope,
            min_value: min.value,
            max_value: max.value,
            min_order: min.order,
            max_order: max.order,
            min_id,
            max_id,
        }
    }

    /// Builder method to set boundary ids
    pub fn with_ids(mut self, min_id: Option<String>, max_id: Option<String>) -> Self {
        self.min_id = min_id;
        self.max_id = max_id;
        self
    }

    pub fn min_bound(&self) -> PageBound {
        PageBound::new(self.min_value, self.min_order)
    }

    pub fn max_bound(&self) -> PageBound {
        PageBound::new(self.max_value, self.max_order)
    }

    pub fn is_complete(&self) -> bool {
        self.min_bound() == PageBound::MIN && self.max_bound() == PageBound::MAX
    }

    /// Strict membership: `bound` lies within `[min, max]`
    pub fn contains(&self, bound: PageBound) -> bool {
        self.min_bound() <= bound && bound <= self.max_bound()
    }

    /// Whether `other` overlaps this interval or touches it under the
    /// adjacency rule, leaving no room for an item in between
    pub fn touches(&self, other: &PageInterval) -> bool {
        self.max_bound().reaches(other.min_bound()) && other.max_bound().reaches(self.min_bound())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> PageScope {
        PageScope::for_key(&AccountId::new("1"), PageItemType::Message, &PageKey::default())
    }

    #[test]
    fn test_new_rejects_inverted_bounds() {
        assert!(PageInterval::new(scope(), PageBound::at(2000), PageBound::at(1000)).is_err());
        assert!(PageInterval::new(scope(), PageBound::new(1000, 2), PageBound::new(1000, 1)).is_err());
        assert!(PageInterval::new(scope(), PageBound::at(1000), PageBound::at(1000)).is_ok());
    }

    #[test]
    fn test_complete() {
        let interval = PageInterval::complete(scope());
        assert!(interval.is_complete());
        assert!(interval.contains(PageBound::at(0)));
    }

    #[test]
    fn test_contains_is_inclusive_and_strict() {
        let interval = PageInterval::new(scope(), PageBound::new(0, 1), PageBound::new(1000, 1001)).unwrap();
        assert!(interval.contains(PageBound::new(0, 1)));
        assert!(interval.contains(PageBound::new(1000, 1001)));
        assert!(!interval.contains(PageBound::new(0, 0)));
        assert!(!interval.contains(PageBound::new(1000, 1002)));
    }

    #[test]
    fn test_touches() {
        let a = PageInterval::new(scope(), PageBound::at(1000), PageBound::new(2000, 2001)).unwrap();
        let b = PageInterval::new(scope(), PageBound::new(2000, 2002), PageBound::at(3000)).unwrap();
        let c = PageInterval::new(scope(), PageBound::new(2000, 2003), PageBound::at(3000)).unwrap();
        assert!(a.touches(&b));
        assert!(!a.touches(&c));
    }

    #[test]
    fn test_scope_for_key() {
        let mut key = PageKey::default();
        key.filter.label_id = LabelId::new("5");
        key.filter.read = ReadStatus::Unread;

        let scope = PageScope::for_key(&AccountId::new("u"), PageItemType::Conversation, &key);
        assert_eq!(scope.label_id.as_str(), "5");
        assert_eq!(scope.read, ReadStatus::Unread);
        assert_eq!(scope.item_type, PageItemType::Conversation);
    }
}
