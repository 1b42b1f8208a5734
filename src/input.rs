//! JSON input for `-f/--file` options.
//!
//! Accepts a file path or `-` for stdin, so definitions can be piped in:
//! `cat monitor.json | dogctl monitor create -f -`.

use crate::error::InputError;
use std::io::Read;
use std::path::Path;

/// Load and parse JSON from a path or stdin (`-`).
pub fn load_json(source: &str) -> Result<serde_json::Value, InputError> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return parse_json("<stdin>", &text);
    }

    let path = Path::new(source);
    if !path.exists() {
        return Err(InputError::NotFound(source.to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    parse_json(source, &text)
}

fn parse_json(source_name: &str, text: &str) -> Result<serde_json::Value, InputError> {
    serde_json::from_str(text).map_err(|e| InputError::Json {
        source_name: source_name.to_string(),
        detail: e.to_string(),
    })
}
