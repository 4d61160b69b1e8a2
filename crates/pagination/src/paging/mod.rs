//! Page interval bookkeeping
//!
//! Remembers which ranges of each mailbox view are known to match the
//! server, so a page can be served from the local cache or fetched only for
//! the part still missing:
//! - [`clip_page_key`] narrows a key before a remote fetch,
//! - [`upsert_page_interval`] records what a fetch covered,
//! - [`validate_local_page`] decides whether a local read is complete,
//! - [`merge_intervals`] keeps the stored intervals minimal.
//!
//! Each operation has a pure form over a slice of intervals and a
//! store-backed form taking a [`PageIntervalStore`](crate::storage::PageIntervalStore).

mod clip;
mod merge;
mod update;
mod validate;

pub use clip::{clip_page_key, get_clipped_page_key};
pub use merge::merge_intervals;
pub use update::{page_interval_for, plan_interval_update, upsert_page_interval};
pub use validate::{is_local_page_valid, validate_local_page};
