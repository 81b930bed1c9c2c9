//! Maintenance command implementation.

use crate::config;
use std::error::Error;

pub fn run(dir: String, shard: u16, replica: u16) -> Result<(), Box<dyn Error>> {
    let dir = config::store_dir(&dir)?;
    let store = config::open_store(&dir)?;

    store.maintenance(shard, replica)?;
    println!("Maintenance complete for shard {} replica {}", shard, replica);
    Ok(())
}
