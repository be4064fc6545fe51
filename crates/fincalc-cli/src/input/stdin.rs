use serde_json::Value;
use std::io::{self, Read};

/// Request piped on stdin, if any. An interactive terminal or empty input
/// yields `None`.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_request(trimmed).map(Some)
}

/// JSON when the text opens an object, YAML otherwise.
fn parse_request(text: &str) -> Result<Value, Box<dyn std::error::Error>> {
    if text.starts_with('{') {
        Ok(serde_json::from_str(text)?)
    } else {
        Ok(serde_yaml::from_str(text)?)
    }
}
