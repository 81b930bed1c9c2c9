//! Related command implementation.

use crate::commands::read_input;
use crate::config;
use crate::output;
use serde_json::Value;
use std::error::Error;
use strata_store::JsonEventDomain;

pub fn run(
    dir: String,
    file: Option<String>,
    replica: u16,
    since: i64,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let dir = config::store_dir(&dir)?;
    let store = config::open_store(&dir)?;

    let text = read_input(file)?;
    let event: Value = serde_json::from_str(&text)?;
    JsonEventDomain::validate(&event)?;

    let page = store.get_related(&event, replica, since)?;
    if json {
        println!("{}", output::format_page_json(&page));
    } else {
        output::print_page_table(&page);
    }
    Ok(())
}
