//! Store directory configuration.

use std::error::Error;
use std::path::{Path, PathBuf};
use strata_store::{EventStore, JsonEventDomain, StoreConfig};

/// Name of the configuration file inside a store directory.
pub const CONFIG_FILE: &str = "store.json";

/// Validates and normalizes a store directory argument.
pub fn store_dir(dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = PathBuf::from(dir);
    if path.as_os_str().is_empty() {
        return Err("store directory must not be empty".into());
    }
    Ok(path)
}

/// Writes a fresh store configuration, refusing to overwrite one.
pub fn save_config(dir: &Path, config: &StoreConfig) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        return Err(format!("{} already exists", path.display()).into());
    }
    std::fs::write(&path, serde_json::to_vec_pretty(config)?)?;
    Ok(())
}

/// Reads the configuration of an existing store directory.
pub fn load_config(dir: &Path) -> Result<StoreConfig, Box<dyn Error>> {
    let path = dir.join(CONFIG_FILE);
    let bytes = std::fs::read(&path)
        .map_err(|e| format!("cannot read {}: {} (did you run init?)", path.display(), e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Opens the JSON-event store persisted in a directory.
pub fn open_store(dir: &Path) -> Result<EventStore<JsonEventDomain>, Box<dyn Error>> {
    let config = load_config(dir)?;
    Ok(EventStore::persistent(JsonEventDomain, config, dir)?)
}
