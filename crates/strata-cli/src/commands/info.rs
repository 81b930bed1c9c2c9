//! Info command implementation.

use crate::config;
use std::error::Error;

pub fn run(dir: String) -> Result<(), Box<dyn Error>> {
    let dir = config::store_dir(&dir)?;
    let store_config = config::load_config(&dir)?;

    println!("store:       {}", dir.display());
    println!("shards:      {}", store_config.num_shards);
    println!("replicas:    {}", store_config.replication_factor);
    println!(
        "partitions:  {}",
        u32::from(store_config.num_shards) * u32::from(store_config.replication_factor)
    );
    Ok(())
}
