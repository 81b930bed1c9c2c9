//! Associate command implementation.

use crate::config;
use std::error::Error;

pub fn run(
    dir: String,
    shard: u16,
    replica: u16,
    type1: String,
    type2: String,
) -> Result<(), Box<dyn Error>> {
    let dir = config::store_dir(&dir)?;
    let store = config::open_store(&dir)?;

    store.associate(&type1, &type2, shard, replica)?;
    println!(
        "Associated {} <-> {} in shard {} replica {}",
        type1, type2, shard, replica
    );
    Ok(())
}
