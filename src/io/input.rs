use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::models::CallExecutionRecord;

/// Load call execution records from a JSON file
pub fn load_records_file(path: &Path) -> Result<Vec<CallExecutionRecord>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let records = parse_records_json(&content)?;
    info!("Loaded {} call executions from {:?}", records.len(), path);
    Ok(records)
}

/// Parse call execution records from a JSON string
pub fn parse_records_json(json: &str) -> Result<Vec<CallExecutionRecord>> {
    let value: Value = serde_json::from_str(json).context("Failed to parse executions JSON")?;
    Ok(records_from_values(execution_list(value)))
}

/// Unwrap the list of executions from any of the shapes the provider returns
///
/// Accepts a bare array, `{"executions": [...]}`, `{"data": [...]}`, or a
/// single execution object.
pub fn execution_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in ["executions", "data"] {
                if !matches!(map.get(key), Some(Value::Array(_))) {
                    continue;
                }
                if let Some(Value::Array(items)) = map.remove(key) {
                    return items;
                }
            }
            vec![Value::Object(map)]
        }
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Convert raw execution objects into records, skipping anything that is not an object
pub fn records_from_values(values: Vec<Value>) -> Vec<CallExecutionRecord> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            if !value.is_object() {
                warn!("Skipping execution #{}: not a JSON object", index);
                return None;
            }
            match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping execution #{}: {}", index, e);
                    None
                }
            }
        })
        .collect()
}
