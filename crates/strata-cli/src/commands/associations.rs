//! Associations command implementation.

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

    let related = store.get_association(&event_type, shard, replica)?;
    if related.is_empty() {
        println!("(no associations)");
    } else {
        for name in related {
            println!("{}", name);
        }
    }
    Ok(())
}
