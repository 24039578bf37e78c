//! # Widget State Store
//!
//! A small durable key-value store for what must survive a process restart:
//! the current page of each widget instance and the last Pokémon that was
//! successfully refreshed.
//!
//! ## Storage Format
//! - **Location**: `[state] path` in the configuration
//! - **Format**: a flat JSON object of string keys to string values
//! - **Writes**: every `set` rewrites the file
//!
//! A missing or corrupt file loads as an empty store; the widget then shows
//! the image page and fallback text until the next successful refresh.

use crate::pager::Page;
use crate::PokemonInfo;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of the per-widget page keys (`page_<widget id>`)
const KEY_PAGE_PREFIX: &str = "page_";
const KEY_ID: &str = "pokemon_id";
const KEY_NAME: &str = "pokemon_name";
const KEY_DESC: &str = "pokemon_description";

/// Errors from persisting widget state.
#[derive(Error, Debug)]
pub enum StateError {
    /// State file could not be written
    #[error("state IO: {0}")]
    Io(#[from] std::io::Error),

    /// State could not be serialized
    #[error("state encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Last refreshed Pokémon as persisted; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedInfo {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// File-backed string key-value store.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl StateStore {
    /// Open the store at `path`, starting empty if the file is missing or unreadable.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt state file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => {
                log::debug!("No state file at {}, starting empty", path.display());
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a value and write the store back to disk.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), StateError> {
        self.values.insert(key.to_string(), value.into());
        self.flush()
    }

    /// Current page of a widget instance, the image page when unset.
    pub fn page(&self, widget_id: u32) -> Page {
        self.get(&page_key(widget_id))
            .and_then(|v| v.parse::<i64>().ok())
            .map(Page::from_index)
            .unwrap_or_default()
    }

    pub fn set_page(&mut self, widget_id: u32, page: Page) -> Result<(), StateError> {
        self.set(&page_key(widget_id), page.index().to_string())
    }

    /// Persist the last successfully refreshed Pokémon in one write.
    pub fn save_info(&mut self, info: &PokemonInfo) -> Result<(), StateError> {
        self.values.insert(KEY_ID.to_string(), info.id.to_string());
        self.values.insert(KEY_NAME.to_string(), info.name.clone());
        self.values.insert(KEY_DESC.to_string(), info.description.clone());
        self.flush()
    }

    pub fn load_info(&self) -> SavedInfo {
        SavedInfo {
            id: self.get(KEY_ID).and_then(|v| v.parse().ok()),
            name: self.get(KEY_NAME).map(str::to_string),
            description: self.get(KEY_DESC).map(str::to_string),
        }
    }

    fn flush(&self) -> Result<(), StateError> {
        let data = serde_json::to_vec_pretty(&self.values)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn page_key(widget_id: u32) -> String {
    format!("{}{}", KEY_PAGE_PREFIX, widget_id)
}
