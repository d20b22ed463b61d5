//! Shared helpers for command implementations

use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};
use tracing::debug;

use occu_core::store::{JsonFileStore, OverrideStore};

use crate::cli::GlobalOpts;

/// File name of the override store inside the config directory
const STORE_FILE: &str = "store.json";

/// Location of the override store: `--store`/`OCCUCALC_STORE`, else the
/// per-user config directory.
pub fn store_path(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(path) = &global.store {
        return Ok(path.clone());
    }
    directories::ProjectDirs::from("", "", "occucalc")
        .map(|dirs| dirs.config_dir().join(STORE_FILE))
        .ok_or_else(|| miette::miette!("Could not determine config directory; pass --store"))
}

/// Open the override store once for this invocation.
pub fn open_store(global: &GlobalOpts) -> Result<OverrideStore<JsonFileStore>> {
    let path = store_path(global)?;
    debug!(path = %path.display(), "using override store");
    Ok(OverrideStore::open(JsonFileStore::open(path)))
}

/// Write raw export bytes atomically, mapping failures to diagnostics.
pub fn write_export(path: &std::path::Path, bytes: &[u8]) -> Result<()> {
    occu_core::file_io::write_atomic(path, bytes).into_diagnostic()
}
