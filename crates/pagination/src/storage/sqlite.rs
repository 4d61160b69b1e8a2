//! SQLite-based page interval storage

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior, params};
use rusqlite_migration::{M, Migrations};

use super::{IntervalChanges, PageIntervalStore};
use crate::models::{AccountId, LabelId, PageBound, PageInterval, PageItemType, PageScope};

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            -- Covered intervals, one row per disjoint interval of a scope
            CREATE TABLE page_intervals (
                account_id TEXT NOT NULL,
                item_type TEXT NOT NULL,
                order_by TEXT NOT NULL,
                label_id TEXT NOT NULL,
                keyword TEXT NOT NULL,
                read_status TEXT NOT NULL,
                min_value INTEGER NOT NULL,
                min_order INTEGER NOT NULL,
                max_value INTEGER NOT NULL,
                max_order INTEGER NOT NULL,
                min_id TEXT,
                max_id TEXT,
                PRIMARY KEY (account_id, item_type, order_by, label_id, keyword, read_status,
                             min_value, min_order)
            );
            "#,
        ),
        // Migration 2: Label invalidation lookups
        M::up(
            r#"
            CREATE INDEX idx_page_intervals_label
                ON page_intervals(account_id, label_id);
            "#,
        ),
    ])
}

/// Columns identifying a scope, bound as parameters ?1 to ?6
const SCOPE_FILTER: &str = "account_id = ?1 AND item_type = ?2 AND order_by = ?3
     AND label_id = ?4 AND keyword = ?5 AND read_status = ?6";

/// SQLite-based page interval storage
///
/// [`transact`](PageIntervalStore::transact) runs inside an IMMEDIATE
/// transaction, so the read of the stored intervals already holds the write
/// lock and concurrent writers of the same database serialize behind it.
pub struct SqlitePageIntervalStore {
    conn: Mutex<Connection>,
}

impl SqlitePageIntervalStore {
    /// Open (or create) the interval database at `db_path`
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;
        Self::from_connection(conn)
    }

    /// Private in-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        // WAL lets readers (clipping, validation) proceed while an update
        // commits.
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            "#,
        )?;

        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Page interval database lock poisoned"))
    }

    /// Load the intervals of a scope, ordered by start
    fn load_intervals(&self, conn: &Connection, scope: &PageScope) -> Result<Vec<PageInterval>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT min_value, min_order, max_value, max_order, min_id, max_id
             FROM page_intervals
             WHERE {SCOPE_FILTER}
             ORDER BY min_value, min_order"
        ))?;

        let rows = stmt
            .query_map(
                params![
                    scope.account_id.as_str(),
                    scope.item_type.as_str(),
                    scope.order_by.as_str(),
                    scope.label_id.as_str(),
                    scope.keyword,
                    scope.read.as_str(),
                ],
                |row| {
                    Ok((
                        PageBound::new(row.get(0)?, row.get(1)?),
                        PageBound::new(row.get(2)?, row.get(3)?),
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut intervals = Vec::with_capacity(rows.len());
        for (min, max, min_id, max_id) in rows {
            match PageInterval::new(scope.clone(), min, max) {
                Ok(interval) => intervals.push(interval.with_ids(min_id, max_id)),
                // Dropping a bad row only loses coverage, which is safe
                Err(e) => warn!("Skipping stored page interval for {:?}: {}", scope.label_id, e),
            }
        }

        Ok(intervals)
    }

    fn delete_interval(&self, conn: &Connection, interval: &PageInterval) -> Result<()> {
        let scope = &interval.scope;
        conn.execute(
            &format!(
                "DELETE FROM page_intervals
                 WHERE {SCOPE_FILTER}
                   AND min_value = ?7 AND min_order = ?8 AND max_value = ?9 AND max_order = ?10"
            ),
            params![
                scope.account_id.as_str(),
                scope.item_type.as_str(),
                scope.order_by.as_str(),
                scope.label_id.as_str(),
                scope.keyword,
                scope.read.as_str(),
                interval.min_value,
                interval.min_order,
                interval.max_value,
                interval.max_order,
            ],
        )?;
        Ok(())
    }

    fn insert_interval(&self, conn: &Connection, interval: &PageInterval) -> Result<()> {
        let scope = &interval.scope;
        conn.execute(
            "INSERT INTO page_intervals
             (account_id, item_type, order_by, label_id, keyword, read_status,
              min_value, min_order, max_value, max_order, min_id, max_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                scope.account_id.as_str(),
                scope.item_type.as_str(),
                scope.order_by.as_str(),
                scope.label_id.as_str(),
                scope.keyword,
                scope.read.as_str(),
                interval.min_value,
                interval.min_order,
                interval.max_value,
                interval.max_order,
                interval.min_id,
                interval.max_id,
            ],
        )
        .with_context(|| {
            format!(
                "Failed to insert page interval [{}, {}]",
                interval.min_bound(),
                interval.max_bound()
            )
        })?;
        Ok(())
    }
}

impl PageIntervalStore for SqlitePageIntervalStore {
    fn get_all(&self, scope: &PageScope) -> Result<Vec<PageInterval>> {
        let conn = self.lock()?;
        self.load_intervals(&conn, scope)
    }

    fn transact(
        &self,
        scope: &PageScope,
        work: &mut dyn FnMut(&[PageInterval]) -> IntervalChanges,
    ) -> Result<IntervalChanges> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let stored = self.load_intervals(&tx, scope)?;
        let changes = work(stored.as_slice());

        // Deletes first: a merged interval may reuse the start of one it replaces
        for interval in &changes.deleted {
            self.delete_interval(&tx, interval)?;
        }
        for interval in &changes.inserted {
            self.insert_interval(&tx, interval)?;
        }

        tx.commit()?;
        Ok(changes)
    }

    fn delete_scope(&self, scope: &PageScope) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!("DELETE FROM page_intervals WHERE {SCOPE_FILTER}"),
            params![
                scope.account_id.as_str(),
                scope.item_type.as_str(),
                scope.order_by.as_str(),
                scope.label_id.as_str(),
                scope.keyword,
                scope.read.as_str(),
            ],
        )?;
        Ok(())
    }

    fn delete_label(&self, account_id: &AccountId, label_id: &LabelId) -> Result<()> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM page_intervals WHERE account_id = ? AND label_id = ?",
            params![account_id.as_str(), label_id.as_str()],
        )?;
        info!("Invalidated {} page intervals of label {}", removed, label_id.as_str());
        Ok(())
    }

    fn delete_type(&self, account_id: &AccountId, item_type: PageItemType) -> Result<()> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM page_intervals WHERE account_id = ? AND item_type = ?",
            params![account_id.as_str(), item_type.as_str()],
        )?;
        info!("Invalidated {} {} page intervals", removed, item_type.as_str());
        Ok(())
    }

    fn delete_account(&self, account_id: &AccountId) -> Result<()> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM page_intervals WHERE account_id = ?",
            [account_id.as_str()],
        )?;
        info!("Dropped {} page intervals of account {}", removed, account_id.as_str());
        Ok(())
    }

    fn count(&self, account_id: &AccountId) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM page_intervals WHERE account_id = ?",
            [account_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("DELETE FROM page_intervals;")?;
        Ok(())
    }
}
