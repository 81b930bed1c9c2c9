//! Output formatting utilities.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;
use strata_store::Page;

/// Formats an event page as a single JSON object.
pub fn format_page_json(page: &Page<Value>) -> String {
    let cursor = page
        .continuation
        .as_ref()
        .map(|c| URL_SAFE_NO_PAD.encode(c.serialize()));
    let body = serde_json::json!({
        "events": page.events,
        "cursor": cursor,
    });
    serde_json::to_string_pretty(&body).unwrap_or_else(|_| "{}".to_string())
}

/// Prints an event page as table rows plus an optional cursor line.
pub fn print_page_table(page: &Page<Value>) {
    print_table_header();
    for event in &page.events {
        println!("{}", format_table_row(event));
    }
    if let Some(continuation) = &page.continuation {
        println!("MORE {}", URL_SAFE_NO_PAD.encode(continuation.serialize()));
    }
}

/// Formats one event as a table row.
pub fn format_table_row(event: &Value) -> String {
    let id = event.get("id").and_then(|v| v.as_str()).unwrap_or("?");
    let event_type = event.get("type").and_then(|v| v.as_str()).unwrap_or("?");
    let change = event
        .get("change")
        .and_then(|v| v.as_i64())
        .map(|c| if c >= 0 { format!("+{c}") } else { c.to_string() })
        .unwrap_or_else(|| "?".to_string());
    let key = decode_field(event, "key");
    let data = decode_field(event, "data");

    format!(
        "{:<24} {:<15} {:<6} {:<20} {}",
        truncate(id, 24),
        event_type,
        change,
        truncate(&key, 20),
        truncate(&data, 40)
    )
}

/// Prints the table header.
pub fn print_table_header() {
    println!(
        "{:<24} {:<15} {:<6} {:<20} {}",
        "ID", "TYPE", "CHANGE", "KEY", "DATA"
    );
    println!("{}", "-".repeat(100));
}

/// Renders a base64url byte field as text when it is printable.
fn decode_field(event: &Value, field: &str) -> String {
    let encoded = event.get(field).and_then(|v| v.as_str()).unwrap_or("");
    match URL_SAFE_NO_PAD.decode(encoded) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) if text.chars().all(|c| !c.is_control()) => text,
            _ => format!("b64:{encoded}"),
        },
        Err(_) => "?".to_string(),
    }
}

/// Renders a key as text when printable, base64url otherwise.
pub fn format_key(key: &[u8]) -> String {
    match std::str::from_utf8(key) {
        Ok(text) if text.chars().all(|c| !c.is_control()) && !text.is_empty() => text.to_string(),
        _ => format!("b64:{}", URL_SAFE_NO_PAD.encode(key)),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
