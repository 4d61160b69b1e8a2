//! Minimal view of a mailbox item used for page bookkeeping

use serde::{Deserialize, Serialize};

use super::{LabelId, PageBound};

/// An item (message or conversation) as seen by the pagination layer
///
/// Only the fields needed to place an item in the ordering space and to test
/// it against a page filter. Implemented by the mail entities of the caller.
pub trait PageItem {
    fn id(&self) -> &str;

    /// Primary sort value (e.g. timestamp in seconds)
    fn time(&self) -> i64;

    /// Tie-break order among items sharing the same time
    fn order(&self) -> i64;

    fn read(&self) -> bool;

    fn label_ids(&self) -> &[LabelId];

    /// Searchable text for keyword filters
    fn keywords(&self) -> &str {
        ""
    }

    fn bound(&self) -> PageBound {
        PageBound::new(self.time(), self.order())
    }
}

/// Plain owned [`PageItem`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxItem {
    pub id: String,
    pub time: i64,
    pub order: i64,
    pub read: bool,
    pub label_ids: Vec<LabelId>,
    #[serde(default)]
    pub keywords: String,
}

impl MailboxItem {
    /// Create an unread item without labels
    pub fn new(id: impl Into<String>, time: i64, order: i64) -> Self {
        Self {
            id: id.into(),
            time,
            order,
            read: false,
            label_ids: Vec::new(),
            keywords: String::new(),
        }
    }

    /// Builder method to set labels
    pub fn with_labels(mut self, label_ids: Vec<LabelId>) -> Self {
        self.label_ids = label_ids;
        self
    }

    /// Builder method to set the read flag
    pub fn with_read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Builder method to set searchable keywords
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }
}

impl PageItem for MailboxItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn time(&self) -> i64 {
        self.time
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn read(&self) -> bool {
        self.read
    }

    fn label_ids(&self) -> &[LabelId] {
        &self.label_ids
    }

    fn keywords(&self) -> &str {
        &self.keywords
    }
}
