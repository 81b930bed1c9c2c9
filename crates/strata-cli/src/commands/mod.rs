//! Command implementations.

pub mod associate;
pub mod associations;
pub mod get;
pub mod info;
pub mod init;
pub mod maintenance;
pub mod more;
pub mod prune;
pub mod related;
pub mod scan_keys;
pub mod store;

use std::error::Error;
use std::io::Read;

/// Reads command input from a file, or stdin when no file is given.
pub(crate) fn read_input(file: Option<String>) -> Result<String, Box<dyn Error>> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {}", path, e))?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
