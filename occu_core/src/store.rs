//! # Override Persistence
//!
//! User factor overrides live in a single namespaced slot of a key-value
//! store. The store is read once at startup and written after every change.
//! Missing or unreadable data is treated as "no overrides".
//!
//! ## Example
//!
//! ```rust
//! use occu_core::factors::CodeSetId;
//! use occu_core::store::{MemoryStore, OverrideStore};
//!
//! let mut overrides = OverrideStore::open(MemoryStore::default());
//! overrides.add_type(CodeSetId::Ibc2024, "Assembly").unwrap();
//!
//! // Reopen over the same backing store: the change was persisted.
//! let reopened = OverrideStore::open(overrides.into_inner());
//! assert!(reopened.active_table(CodeSetId::Ibc2024).contains("Assembly"));
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{OccuError, OccuResult};
use crate::factors::{CodeSetId, FactorOverrides, FactorTable};
use crate::file_io::write_atomic;

/// Store key holding the serialized [`FactorOverrides`]
pub const OVERRIDES_KEY: &str = "occuCalc.codeOverrides.v1";

/// Minimal string key-value slot storage.
pub trait KeyValueStore {
    /// Read a slot. Unreadable storage behaves like an absent slot.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a slot, persisting it before returning.
    fn set(&mut self, key: &str, value: String) -> OccuResult<()>;
}

/// In-memory store, useful for tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> OccuResult<()> {
        self.slots.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a JSON object file (`{ "key": "value", ... }`).
///
/// Writes go through [`write_atomic`], so an interrupted save leaves the
/// previous file intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    slots: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; a file
    /// that cannot be read or parsed is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let slots = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable store file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read store file");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), slots = slots.len(), "opened store");
        JsonFileStore { path, slots }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> OccuResult<()> {
        self.slots.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                OccuError::file_error("create store directory", parent.display().to_string(), e.to_string())
            })?;
        }
        let json = serde_json::to_string_pretty(&self.slots)?;
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Factor overrides bound to the store they were loaded from.
///
/// Every successful mutation is written back immediately; mutations that
/// change nothing (invalid factor, duplicate type, base type delete) skip
/// the write and return `Ok(false)`.
#[derive(Debug)]
pub struct OverrideStore<S: KeyValueStore> {
    store: S,
    overrides: FactorOverrides,
}

impl<S: KeyValueStore> OverrideStore<S> {
    /// Load overrides from `store`, treating absent or corrupt data as empty.
    pub fn open(store: S) -> Self {
        let overrides = match store.get(OVERRIDES_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key = OVERRIDES_KEY, error = %e, "discarding corrupt factor overrides");
                FactorOverrides::default()
            }),
            None => FactorOverrides::default(),
        };
        OverrideStore { store, overrides }
    }

    /// Active factor table for `code` (base factors plus overrides)
    pub fn active_table(&self, code: CodeSetId) -> FactorTable {
        self.overrides.active_table(code)
    }

    pub fn overrides(&self) -> &FactorOverrides {
        &self.overrides
    }

    pub fn set_factor(&mut self, code: CodeSetId, occupancy_type: &str, factor: f64) -> OccuResult<bool> {
        let changed = self.overrides.set_factor(code, occupancy_type, factor);
        self.persist_if(changed)
    }

    pub fn add_type(&mut self, code: CodeSetId, name: &str) -> OccuResult<bool> {
        let changed = self.overrides.add_type(code, name);
        self.persist_if(changed)
    }

    pub fn delete_type(&mut self, code: CodeSetId, occupancy_type: &str) -> OccuResult<bool> {
        let changed = self.overrides.delete_type(code, occupancy_type);
        self.persist_if(changed)
    }

    pub fn reset(&mut self, code: CodeSetId) -> OccuResult<bool> {
        let changed = self.overrides.reset(code);
        self.persist_if(changed)
    }

    /// Give back the underlying store
    pub fn into_inner(self) -> S {
        self.store
    }

    fn persist_if(&mut self, changed: bool) -> OccuResult<bool> {
        if changed {
            let json = serde_json::to_string(&self.overrides)?;
            self.store.set(OVERRIDES_KEY, json)?;
            debug!(key = OVERRIDES_KEY, "saved factor overrides");
        }
        Ok(changed)
    }
}
