//! Init command implementation.

use crate::config;
use std::error::Error;
use strata_store::StoreConfig;

pub fn run(dir: String, shards: u16, replicas: u16) -> Result<(), Box<dyn Error>> {
    if shards == 0 {
        return Err("--shards must be at least 1".into());
    }
    if replicas == 0 {
        return Err("--replicas must be at least 1".into());
    }

    let dir = config::store_dir(&dir)?;
    let store_config = StoreConfig {
        num_shards: shards,
        replication_factor: replicas,
    };
    config::save_config(&dir, &store_config)?;

    println!(
        "Initialized store at {} ({} shards x {} replicas)",
        dir.display(),
        shards,
        replicas
    );
    Ok(())
}
