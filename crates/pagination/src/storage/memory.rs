//! In-memory storage implementation
//!
//! Used for testing and for callers that do not persist the cache.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Result, anyhow};
use log::info;

use super::{IntervalChanges, PageIntervalStore};
use crate::models::{AccountId, LabelId, PageInterval, PageItemType, PageScope};

type ScopeMap = HashMap<PageScope, Vec<PageInterval>>;

/// In-memory implementation of PageIntervalStore
///
/// One RwLock guards every scope; holding the write lock for a whole
/// [`transact`](PageIntervalStore::transact) call is what makes the update
/// atomic.
pub struct InMemoryPageIntervalStore {
    scopes: RwLock<ScopeMap>,
}

impl InMemoryPageIntervalStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            scopes: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ScopeMap>> {
        self.scopes
            .read()
            .map_err(|_| anyhow!("Page interval store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ScopeMap>> {
        self.scopes
            .write()
            .map_err(|_| anyhow!("Page interval store lock poisoned"))
    }

    fn retain_scopes(&self, keep: impl Fn(&PageScope) -> bool) -> Result<()> {
        self.write()?.retain(|scope, _| keep(scope));
        Ok(())
    }
}

impl Default for InMemoryPageIntervalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageIntervalStore for InMemoryPageIntervalStore {
    fn get_all(&self, scope: &PageScope) -> Result<Vec<PageInterval>> {
        let scopes = self.read()?;
        Ok(scopes.get(scope).cloned().unwrap_or_default())
    }

    fn transact(
        &self,
        scope: &PageScope,
        work: &mut dyn FnMut(&[PageInterval]) -> IntervalChanges,
    ) -> Result<IntervalChanges> {
        let mut scopes = self.write()?;
        let stored = scopes.entry(scope.clone()).or_default();

        let changes = work(stored.as_slice());

        stored.retain(|interval| !changes.deleted.contains(interval));
        for interval in &changes.inserted {
            if !stored.contains(interval) {
                stored.push(interval.clone());
            }
        }
        stored.sort_by_key(|interval| interval.min_bound());

        if stored.is_empty() {
            scopes.remove(scope);
        }

        Ok(changes)
    }

    fn delete_scope(&self, scope: &PageScope) -> Result<()> {
        self.write()?.remove(scope);
        Ok(())
    }

    fn delete_label(&self, account_id: &AccountId, label_id: &LabelId) -> Result<()> {
        info!("Invalidating page intervals of label {}", label_id.as_str());
        self.retain_scopes(|scope| !(&scope.account_id == account_id && &scope.label_id == label_id))
    }

    fn delete_type(&self, account_id: &AccountId, item_type: PageItemType) -> Result<()> {
        info!("Invalidating {} page intervals", item_type.as_str());
        self.retain_scopes(|scope| !(&scope.account_id == account_id && scope.item_type == item_type))
    }

    fn delete_account(&self, account_id: &AccountId) -> Result<()> {
        info!("Dropping page intervals of account {}", account_id.as_str());
        self.retain_scopes(|scope| &scope.account_id != account_id)
    }

    fn count(&self, account_id: &AccountId) -> Result<usize> {
        let scopes = self.read()?;
        Ok(scopes
            .iter()
            .filter(|(scope, _)| &scope.account_id == account_id)
            .map(|(_, intervals)| intervals.len())
            .sum())
    }

    fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }
}
