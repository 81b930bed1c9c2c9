//! Scan-keys command implementation.

use crate::config;
use crate::output;
use std::error::Error;

pub fn run(dir: String, shard: u16, replica: u16) -> Result<(), Box<dyn Error>> {
    let dir = config::store_dir(&dir)?;
    let store = config::open_store(&dir)?;

    let keys = store.scan_keys(shard, replica)?;
    if keys.is_empty() {
        println!("(no keys)");
    } else {
        for key in keys {
            println!("{}", output::format_key(&key));
        }
    }
    Ok(())
}
