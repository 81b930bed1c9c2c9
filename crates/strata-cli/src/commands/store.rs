//! Store command implementation.

use crate::commands::read_input;
use crate::config;
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use strata_store::{shard_of, EventDomain, JsonEventDomain};

pub fn run(
    dir: String,
    replica: u16,
    timestamp: Option<i64>,
    file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let dir = config::store_dir(&dir)?;
    let store = config::open_store(&dir)?;

    let text = read_input(file)?;
    let value: Value = serde_json::from_str(&text)?;
    let events = match value {
        Value::Array(events) => events,
        object => vec![object],
    };
    if events.is_empty() {
        return Err("no events to store".into());
    }
    for event in &events {
        JsonEventDomain::validate(event)?;
    }

    let timestamp = timestamp.unwrap_or_else(|| Utc::now().timestamp_millis());

    // The store accepts a batch for one shard; events for different
    // shards become separate batches. Atomicity holds per batch.
    let domain = JsonEventDomain;
    let mut batches: BTreeMap<u16, Vec<Value>> = BTreeMap::new();
    for event in events {
        let shard = shard_of(&domain.key(&event), store.num_shards());
        batches.entry(shard).or_default().push(event);
    }

    let batch_count = batches.len();
    let mut stored = 0usize;
    for batch in batches.into_values() {
        store.store(&batch, replica, timestamp)?;
        stored += batch.len();
    }

    println!(
        "Stored {} events in {} batches at timestamp {} (replica {})",
        stored, batch_count, timestamp, replica
    );
    Ok(())
}
