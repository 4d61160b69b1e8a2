//! Storage traits and implementations
//!
//! [`PageIntervalStore`] is implemented in memory for tests and callers
//! without a disk cache, and on SQLite for the persisted interval database.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryPageIntervalStore;
pub use sqlite::SqlitePageIntervalStore;
pub use traits::{IntervalChanges, PageIntervalStore};
