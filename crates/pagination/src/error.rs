//! Domain errors for page keys and intervals

use crate::models::PageBound;

/// Precondition failures when building pagination values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("Invalid range: min {min} is after max {max}")]
    InvalidRange { min: PageBound, max: PageBound },

    #[error("Unknown {kind}: {value:?}")]
    UnknownValue { kind: &'static str, value: String },
}

impl PaginationError {
    pub(crate) fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownValue {
            kind,
            value: value.into(),
        }
    }
}
