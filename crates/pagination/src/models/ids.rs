//! Identifier newtypes

use serde::{Deserialize, Serialize};

/// Owning account of cached mail data
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a label or folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Well-known system labels
    pub const INBOX: &'static str = "0";
    pub const ALL_DRAFTS: &'static str = "1";
    pub const ALL_SENT: &'static str = "2";
    pub const TRASH: &'static str = "3";
    pub const SPAM: &'static str = "4";
    pub const ALL_MAIL: &'static str = "5";
    pub const ARCHIVE: &'static str = "6";
    pub const STARRED: &'static str = "10";

    pub fn inbox() -> Self {
        Self::new(Self::INBOX)
    }
}

impl Default for LabelId {
    fn default() -> Self {
        Self::inbox()
    }
}

impl From<String> for LabelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LabelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
