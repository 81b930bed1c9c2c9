//! Prune command implementation.

use crate::config;
use std::error::Error;

pub fn run(
    dir: String,
    shard: u16,
    replica: u16,
    event_type: String,
) -> Result<(), Box<dyn Error>> {
    let dir = config::store_dir(&dir)?;
    let store = config::open_store(&dir)?;

    store.prune_type(&event_type, shard, replica)?;
    println!(
        "Pruned type {} from shard {} replica {}",
        event_type, shard, replica
    );
    Ok(())
}
