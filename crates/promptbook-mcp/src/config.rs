//! Book registry: which remote databases are addressable, and which one
//! is active.
//!
//! The registry is a JSON file under the user config dir. It is loaded
//! as an explicit snapshot at the top of each tool invocation and passed
//! down — operations never re-read it midway, so one invocation sees one
//! consistent view.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment override for the registry path.
pub const CONFIG_ENV: &str = "PROMPTBOOK_CONFIG";

/// One prompt book: a remote database plus the credentials to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub token: String,
    pub database_id: String,
}

/// The set of configured books and the active selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookRegistry {
    #[serde(default)]
    pub books: BTreeMap<String, Book>,
    #[serde(default)]
    pub active: Option<String>,
}

impl BookRegistry {
    /// Registry location: `$PROMPTBOOK_CONFIG`, or
    /// `<config_dir>/promptbook/books.json`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("promptbook")
            .join("books.json")
    }

    /// Load a snapshot. A missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
    }

    /// Resolve which book an operation targets: an explicit name, or the
    /// active book. Errors are tool-ready user-facing strings.
    pub fn resolve<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Book), String> {
        let name = match name {
            Some(n) => n,
            None => self.active.as_deref().ok_or_else(|| {
                "no active book; add one with book_add or select one with book_use".to_string()
            })?,
        };
        let book = self
            .books
            .get(name)
            .ok_or_else(|| format!("book '{name}' is not configured"))?;
        Ok((name, book))
    }
}
