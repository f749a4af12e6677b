//! Line grammar of the state program's stdout.
//!
//! ```text
//! TotalSize=1000
//! UserID=1000 JobID=17 Name=buf1 Size=4G State=STAGING_IN
//! ```
//!
//! `UserID` opens a repeatable entry; the remaining tokens of its line
//! fill the entry's nested dict. The assembled tree is handed to the
//! shared parser engine, so value coercion, size suffixes, and state
//! names all follow the registry descriptors.

use crate::error::PluginError;
use serde_json::{json, Map, Value};
use wlm_data_parser::model::BurstBufferStatus;
use wlm_data_parser::{parse_as, ParserArgs, Resolvers, TypeId};

/// Convert the raw stdout into the wire tree of `BURST_BUFFER_STATUS`.
pub fn report_to_tree(stdout: &str) -> Result<Value, PluginError> {
    let mut total_size = Value::Null;
    let mut allocations: Vec<Value> = Vec::new();

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut entry: Option<Map<String, Value>> = None;
        for token in line.split_whitespace() {
            let (key, value) = token.split_once('=').ok_or_else(|| {
                PluginError::BadStateReport(format!("expected Key=Value, got {token:?}"))
            })?;
            match key {
                "TotalSize" => total_size = Value::String(value.to_string()),
                "UserID" => {
                    let mut map = Map::new();
                    map.insert("user_id".into(), coerce_token(value));
                    entry = Some(map);
                }
                "JobID" | "Name" | "Size" | "State" => {
                    let entry = entry.as_mut().ok_or_else(|| {
                        PluginError::BadStateReport(format!("{key} before UserID on line {line:?}"))
                    })?;
                    let field = match key {
                        "JobID" => "job_id",
                        "Name" => "name",
                        "Size" => "size",
                        _ => "state",
                    };
                    entry.insert(field.into(), coerce_token(value));
                }
                other => {
                    tracing::warn!(token = other, "unknown state report token ignored");
                }
            }
        }
        if let Some(entry) = entry {
            allocations.push(Value::Object(entry));
        }
    }

    if total_size.is_null() {
        return Err(PluginError::BadStateReport(
            "report carries no TotalSize".into(),
        ));
    }
    Ok(json!({
        "total_size": total_size,
        "allocations": allocations,
    }))
}

/// Parse a full report through the engine.
pub fn parse_report(stdout: &str) -> Result<BurstBufferStatus, PluginError> {
    let tree = report_to_tree(stdout)?;
    let mut args = ParserArgs::parsing(Resolvers::default());
    parse_as::<BurstBufferStatus>(TypeId::BurstBufferStatus, &tree, &mut args).map_err(|error| {
        let detail = args
            .first_error()
            .map(|diag| format!("{} at {}", diag.description, diag.source_path))
            .unwrap_or_else(|| error.to_string());
        PluginError::BadStateReport(detail)
    })
}

fn coerce_token(value: &str) -> Value {
    match value.parse::<u64>() {
        Ok(n) => json!(n),
        Err(_) => Value::String(value.to_string()),
    }
}
