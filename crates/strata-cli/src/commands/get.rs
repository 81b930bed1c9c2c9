//! Get command implementation.

use crate::config;
use crate::output;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::error::Error;

#[allow(clippy::too_many_arguments)]
pub fn run(
    dir: String,
    event_type: String,
    key: String,
    key_b64: bool,
    replica: u16,
    since: i64,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let dir = config::store_dir(&dir)?;
    let store = config::open_store(&dir)?;

    let key_bytes = if key_b64 {
        URL_SAFE_NO_PAD
            .decode(key.as_bytes())
            .map_err(|e| format!("--key is not base64url: {e}"))?
    } else {
        key.into_bytes()
    };

    let page = store.get(&event_type, &key_bytes, replica, since)?;
    if json {
        println!("{}", output::format_page_json(&page));
    } else {
        output::print_page_table(&page);
    }
    Ok(())
}
