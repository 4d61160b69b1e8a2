//! Page keys: the unit of one fetch or local query

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{LabelId, PageBound, PageItem};
use crate::error::PaginationError;

/// Kind of item listed in a mailbox view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PageItemType {
    Message,
    Conversation,
}

impl PageItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Conversation => "conversation",
        }
    }
}

impl FromStr for PageItemType {
    type Err = PaginationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(Self::Message),
            "conversation" => Ok(Self::Conversation),
            other => Err(PaginationError::unknown("item type", other)),
        }
    }
}

/// Primary sort field of a mailbox view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderBy {
    #[default]
    Time,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
        }
    }
}

impl FromStr for OrderBy {
    type Err = PaginationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(Self::Time),
            other => Err(PaginationError::unknown("order by", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderDirection {
    Ascending,
    #[default]
    Descending,
}

/// Read-status filter of a mailbox view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReadStatus {
    #[default]
    All,
    Read,
    Unread,
}

impl ReadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Read => "read",
            Self::Unread => "unread",
        }
    }

    /// Whether an item with the given read flag passes this filter
    pub fn matches(&self, read: bool) -> bool {
        match self {
            Self::All => true,
            Self::Read => read,
            Self::Unread => !read,
        }
    }
}

impl FromStr for ReadStatus {
    type Err = PaginationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "read" => Ok(Self::Read),
            "unread" => Ok(Self::Unread),
            other => Err(PaginationError::unknown("read status", other)),
        }
    }
}

/// Which items a page key selects
///
/// The range is inclusive on both ends. `min_id`/`max_id` name the item
/// sitting exactly on a bound when it is known, so a query continuing from a
/// previous page can skip it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFilter {
    pub label_id: LabelId,
    pub keyword: String,
    pub read: ReadStatus,
    pub min_time: i64,
    pub min_order: i64,
    pub min_id: Option<String>,
    pub max_time: i64,
    pub max_order: i64,
    pub max_id: Option<String>,
}

impl Default for PageFilter {
    fn default() -> Self {
        Self {
            label_id: LabelId::inbox(),
            keyword: String::new(),
            read: ReadStatus::All,
            min_time: i64::MIN,
            min_order: i64::MIN,
            min_id: None,
            max_time: i64::MAX,
            max_order: i64::MAX,
            max_id: None,
        }
    }
}

impl PageFilter {
    /// Filter over `[min, max]`, rejecting an inverted range
    pub fn with_range(min: PageBound, max: PageBound) -> Result<Self, PaginationError> {
        if min > max {
            return Err(PaginationError::InvalidRange { min, max });
        }
        Ok(Self {
            min_time: min.value,
            min_order: min.order,
            max_time: max.value,
            max_order: max.order,
            ..Self::default()
        })
    }

    /// Builder method to set the label
    pub fn label(mut self, label_id: impl Into<LabelId>) -> Self {
        self.label_id = label_id.into();
        self
    }

    /// Builder method to set the keyword
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    /// Builder method to set the read-status filter
    pub fn read(mut self, read: ReadStatus) -> Self {
        self.read = read;
        self
    }

    pub fn min_bound(&self) -> PageBound {
        PageBound::new(self.min_time, self.min_order)
    }

    pub fn max_bound(&self) -> PageBound {
        PageBound::new(self.max_time, self.max_order)
    }

    /// Whether `bound` falls inside the filter range
    pub fn contains(&self, bound: PageBound) -> bool {
        self.min_bound() <= bound && bound <= self.max_bound()
    }

    /// Whether an item belongs to the page this filter selects
    pub fn matches<I: PageItem + ?Sized>(&self, item: &I) -> bool {
        self.contains(item.bound())
            && item.label_ids().contains(&self.label_id)
            && self.read.matches(item.read())
            && self.matches_keyword(item.keywords())
    }

    fn matches_keyword(&self, keywords: &str) -> bool {
        self.keyword.is_empty() || keywords.to_lowercase().contains(&self.keyword.to_lowercase())
    }
}

/// A requested range plus ordering and size: one fetch or local query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageKey {
    pub filter: PageFilter,
    pub order_by: OrderBy,
    pub order_direction: OrderDirection,
    pub size: usize,
}

impl Default for PageKey {
    /// Newest-first first page of the inbox
    fn default() -> Self {
        Self {
            filter: PageFilter::default(),
            order_by: OrderBy::Time,
            order_direction: OrderDirection::Descending,
            size: Self::DEFAULT_SIZE,
        }
    }
}

impl PageKey {
    pub const DEFAULT_SIZE: usize = 50;

    pub fn new(filter: PageFilter, order_direction: OrderDirection, size: usize) -> Self {
        Self {
            filter,
            order_by: OrderBy::Time,
            order_direction,
            size,
        }
    }

    /// Whether a page of `count` items ended before reaching `size`
    ///
    /// A short page is taken to mean the source has nothing more in range.
    pub fn is_short(&self, count: usize) -> bool {
        count < self.size
    }

    /// Copy of this key restricted to `[min, max]`
    pub fn with_bounds(
        &self,
        min: PageBound,
        min_id: Option<String>,
        max: PageBound,
        max_id: Option<String>,
    ) -> PageKey {
        let mut key = self.clone();
        key.filter.min_time = min.value;
        key.filter.min_order = min.order;
        key.filter.min_id = min_id;
        key.filter.max_time = max.value;
        key.filter.max_order = max.order;
        key.filter.max_id = max_id;
        key
    }

    /// Key of the page following `items` in this key's direction
    ///
    /// Returns `None` when `items` is a short page, since there is nothing
    /// after it. The last item stays inside the new range and is named by the
    /// boundary id.
    pub fn next_page<I: PageItem>(&self, items: &[I]) -> Option<PageKey> {
        if self.is_short(items.len()) {
            return None;
        }
        let last = items.last()?;
        let filter = &self.filter;
        let next = match self.order_direction {
            OrderDirection::Ascending => self.with_bounds(
                last.bound(),
                Some(last.id().to_string()),
                filter.max_bound(),
                filter.max_id.clone(),
            ),
            OrderDirection::Descending => self.with_bounds(
                filter.min_bound(),
                filter.min_id.clone(),
                last.bound(),
                Some(last.id().to_string()),
            ),
        };
        Some(next)
    }
}
