//! Pagination settings
//!
//! Read from `pagination.json` in the Cosmos config directory. Every field is
//! optional; a missing file means all defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::ConfigDir;
use serde::{Deserialize, Serialize};

use crate::models::PageKey;
use crate::storage::SqlitePageIntervalStore;

/// Settings filename in the Cosmos config directory
const CONFIG_FILE: &str = "pagination.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Items requested per page
    pub page_size: usize,
    /// Interval database, relative to the config directory unless absolute
    pub database_file: PathBuf,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: PageKey::DEFAULT_SIZE,
            database_file: PathBuf::from("pagination.db"),
        }
    }
}

impl PaginationConfig {
    /// Load from the default Cosmos config directory
    pub fn load() -> Result<Self> {
        let dir = ConfigDir::cosmos().context("Could not determine config directory")?;
        Self::load_from(&dir)
    }

    /// Load from `dir`, falling back to defaults when the file is absent
    pub fn load_from(dir: &ConfigDir) -> Result<Self> {
        let config = dir.load_json_opt::<Self>(CONFIG_FILE)?.unwrap_or_default();
        anyhow::ensure!(config.page_size > 0, "page_size in {CONFIG_FILE} must be positive");
        Ok(config)
    }

    pub fn save_to(&self, dir: &ConfigDir) -> Result<()> {
        dir.save_json(CONFIG_FILE, self)
    }

    /// First page of the inbox, newest first, with the configured size
    pub fn page_key(&self) -> PageKey {
        PageKey {
            size: self.page_size,
            ..PageKey::default()
        }
    }

    /// Where the interval database lives for config directory `dir`
    pub fn database_path(&self, dir: &ConfigDir) -> PathBuf {
        if self.database_file.is_absolute() {
            self.database_file.clone()
        } else {
            dir.root().join(&self.database_file)
        }
    }

    /// Open the interval database, creating its directory if needed
    pub fn open_store(&self, dir: &ConfigDir) -> Result<SqlitePageIntervalStore> {
        let path = self.database_path(dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {}", parent.display()))?;
        }
        SqlitePageIntervalStore::new(path)
    }
}
