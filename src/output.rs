//! Text rendering of API results.

use chrono::{SecondsFormat, TimeZone, Utc};
use crossterm::style::Stylize;
use serde_json::Value;

use crate::api::types::{Account, Key, LogEntry};

/// Renders one log entry as a single line:
/// `2024-05-01T10:00:00.000Z ERROR disk full host=db-1`.
///
/// With `color` set the level is colored with ANSI escapes.
pub fn format_log(entry: &LogEntry, color: bool) -> String {
    let mut line = format!(
        "{} {} {}",
        format_timestamp(&entry.timestamp),
        format_level(&entry.level, color),
        plain(&entry.message)
    );
    for (key, value) in &entry.fields {
        line.push(' ');
        line.push_str(key);
        line.push('=');
        line.push_str(&plain(value));
    }
    line
}

/// Strings print without quotes, null as nothing, the rest as JSON.
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn format_timestamp(value: &Value) -> String {
    match value.as_i64() {
        Some(0) => "-".to_string(),
        Some(ms) => match Utc.timestamp_millis_opt(ms).single() {
            Some(ts) => ts.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => ms.to_string(),
        },
        None => match plain(value) {
            s if s.is_empty() => "-".to_string(),
            s => s,
        },
    }
}

fn format_level(value: &Value, color: bool) -> String {
    let level = match plain(value) {
        s if s.is_empty() => "-".to_string(),
        s => s.to_uppercase(),
    };
    let padded = format!("{:<5}", level);
    if !color {
        return padded;
    }
    match level.as_str() {
        "ERROR" | "FATAL" | "PANIC" => padded.red().to_string(),
        "WARN" | "WARNING" => padded.yellow().to_string(),
        "INFO" => padded.green().to_string(),
        "DEBUG" | "TRACE" => padded.dark_grey().to_string(),
        _ => padded,
    }
}

pub fn format_account(account: &Account) -> String {
    let mut line = account.id.clone();
    if !account.account_type.is_empty() {
        line.push_str(&format!(" ({})", account.account_type));
    }
    if let Some(name) = &account.name {
        line.push_str(&format!(" {}", name));
    }
    if let Some(created) = &account.created_at {
        line.push_str(&format!(" created {}", created));
    }
    line
}

pub fn format_key(key: &Key) -> String {
    let mut line = key.id.clone();
    if let Some(secret) = &key.secret {
        line.push_str(&format!(" secret={}", secret));
    }
    if let Some(created) = &key.created_at {
        line.push_str(&format!(" created {}", created));
    }
    line
}
