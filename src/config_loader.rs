// Configuration loader for Tingwu API
//
// This module seeds environment variables from an optional flat TOML
// configuration file. Environment variables that are already set always
// win; application defaults apply last (handled by the config structs).

use std::env;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use toml::Value;

const CONFIG_FILE_PATH: &str = "tingwu_api.conf";

/// Load the configuration file, if present, into unset environment variables
///
/// Returns true if the config file was successfully loaded, false otherwise.
pub fn load_config() -> bool {
    let config_path = Path::new(CONFIG_FILE_PATH);

    if !config_path.exists() {
        debug!("Configuration file not found at: {}", CONFIG_FILE_PATH);
        return false;
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read configuration file: {}", e);
            return false;
        }
    };

    let config_values: Value = match config_content.parse() {
        Ok(values) => values,
        Err(e) => {
            warn!("Failed to parse configuration file: {}", e);
            return false;
        }
    };

    for (key, value) in flatten_entries(config_values) {
        if env::var(&key).is_err() {
            debug!("Setting env var from config file: {} = {}", key, value);
            env::set_var(key, value);
        } else {
            debug!("Env var already exists, skipping: {}", key);
        }
    }

    info!("Configuration loaded from {}", CONFIG_FILE_PATH);
    true
}

/// Convert a flat TOML table into string key-value pairs
///
/// Nested tables and arrays have no environment-variable representation
/// and are skipped with a warning.
fn flatten_entries(config: Value) -> Vec<(String, String)> {
    let table = match config {
        Value::Table(table) => table,
        _ => return Vec::new(),
    };

    let mut entries = Vec::with_capacity(table.len());
    for (key, value) in table {
        match value {
            Value::String(s) => entries.push((key, s)),
            Value::Integer(i) => entries.push((key, i.to_string())),
            Value::Float(f) => entries.push((key, f.to_string())),
            Value::Boolean(b) => entries.push((key, b.to_string())),
            _ => warn!("Skipping unsupported TOML value type for key: {}", key),
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_scalar_values() {
        let config: Value = r#"
            TINGWU_ENDPOINT = "https://tingwu.example.com"
            TINGWU_POLL_INTERVAL_MS = 10000
            TINGWU_VERBOSE = true
        "#
        .parse()
        .unwrap();

        let mut entries = flatten_entries(config);
        entries.sort();

        assert_eq!(
            entries,
            vec![
                (
                    "TINGWU_ENDPOINT".to_string(),
                    "https://tingwu.example.com".to_string()
                ),
                ("TINGWU_POLL_INTERVAL_MS".to_string(), "10000".to_string()),
                ("TINGWU_VERBOSE".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_flatten_skips_nested_values() {
        let config: Value = r#"
            KEEP = "yes"
            [nested]
            DROP = "no"
        "#
        .parse()
        .unwrap();

        let entries = flatten_entries(config);
        assert_eq!(entries, vec![("KEEP".to_string(), "yes".to_string())]);
    }
}
