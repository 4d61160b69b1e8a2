//! Storage trait definitions

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::{AccountId, LabelId, PageInterval, PageItemType, PageScope};

/// Writes produced by one interval update
///
/// Intervals in `deleted` were consumed by a merge and must be removed;
/// intervals in `inserted` are the merged results that are not stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalChanges {
    pub deleted: Vec<PageInterval>,
    pub inserted: Vec<PageInterval>,
}

impl IntervalChanges {
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.inserted.is_empty()
    }
}

/// Trait for page interval storage
///
/// Intervals are partitioned by [`PageScope`]. Implementations must make
/// [`transact`](PageIntervalStore::transact) atomic with respect to other
/// calls for the same scope.
pub trait PageIntervalStore: Send + Sync {
    /// All intervals stored for a scope, ordered by start
    fn get_all(&self, scope: &PageScope) -> Result<Vec<PageInterval>>;

    /// Read-modify-write of one scope as a single unit of work
    ///
    /// `work` receives the stored intervals and returns the changes to apply.
    /// Reading, computing and writing happen inside one transaction, so two
    /// concurrent updates of the same scope cannot lose each other's writes.
    fn transact(
        &self,
        scope: &PageScope,
        work: &mut dyn FnMut(&[PageInterval]) -> IntervalChanges,
    ) -> Result<IntervalChanges>;

    /// Delete every interval of a scope
    fn delete_scope(&self, scope: &PageScope) -> Result<()>;

    /// Delete every interval of a label, across item types and filters
    ///
    /// Used when a label is known to be stale, e.g. after emptying a folder.
    fn delete_label(&self, account_id: &AccountId, label_id: &LabelId) -> Result<()>;

    /// Delete every interval of an item type for an account
    fn delete_type(&self, account_id: &AccountId, item_type: PageItemType) -> Result<()>;

    /// Delete every interval of an account
    fn delete_account(&self, account_id: &AccountId) -> Result<()>;

    /// Count intervals stored for an account
    fn count(&self, account_id: &AccountId) -> Result<usize>;

    /// Clear all data (for testing)
    fn clear(&self) -> Result<()>;
}
