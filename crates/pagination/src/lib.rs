//! Pagination crate - Page interval cache for mailbox views
//!
//! Tracks which ranges of each mailbox view (account, item type, label,
//! keyword and read filter) are known to match the server:
//! - Domain models (PageBound, PageKey, PageInterval, PageScope)
//! - Interval merging, key clipping and local page validation
//! - Storage trait abstractions with in-memory and SQLite backends
//! - Configuration for page size and the interval database
//!
//! The crate does no fetching itself. Callers clip a key before a remote
//! fetch, record the fetched page, and validate pages read from their local
//! cache before trusting them.

pub mod config;
pub mod error;
pub mod models;
pub mod paging;
pub mod storage;

pub use self::config::PaginationConfig;
pub use error::PaginationError;
pub use models::{
    AccountId, LabelId, MailboxItem, OrderBy, OrderDirection, PageBound, PageFilter, PageInterval,
    PageItem, PageItemType, PageKey, PageScope, ReadStatus,
};
pub use paging::{
    clip_page_key, get_clipped_page_key, is_local_page_valid, merge_intervals, page_interval_for,
    plan_interval_update, upsert_page_interval, validate_local_page,
};
pub use storage::{IntervalChanges, InMemoryPageIntervalStore, PageIntervalStore, SqlitePageIntervalStore};
