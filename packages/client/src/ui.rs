//! Terminal helpers for the CLI client.

use std::io::Write;

use serde_json::Value;

/// Redisplay the prompt after printing a message
pub fn redisplay_prompt(user_name: &str) {
    print!("{}> ", user_name);
    std::io::stdout().flush().ok();
}

/// Turn an input line into a broadcast payload.
///
/// Valid JSON is sent as that value, anything else as a JSON string.
pub fn parse_payload(line: &str) -> Value {
    serde_json::from_str(line).unwrap_or_else(|_| Value::String(line.to_string()))
}
