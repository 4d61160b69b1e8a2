//! Domain models for mailbox pagination

mod bound;
mod ids;
mod interval;
mod page_item;
mod page_key;

pub use bound::PageBound;
pub use ids::{AccountId, LabelId};
pub use interval::{PageInterval, PageScope};
pub use page_item::{MailboxItem, PageItem};
pub use page_key::{OrderBy, OrderDirection, PageFilter, PageItemType, PageKey, ReadStatus};
