//! More command implementation.

use crate::config;
use crate::output;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::error::Error;

pub fn run(dir: String, cursor: String, json: bool) -> Result<(), Box<dyn Error>> {
    let dir = config::store_dir(&dir)?;
    let store = config::open_store(&dir)?;

    let bytes = URL_SAFE_NO_PAD
        .decode(cursor.trim().as_bytes())
        .map_err(|e| format!("--cursor is not base64url: {e}"))?;

    let page = store.more(&bytes)?;
    if json {
        println!("{}", output::format_page_json(&page));
    } else {
        output::print_page_table(&page);
    }
    Ok(())
}
