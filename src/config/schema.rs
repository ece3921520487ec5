//! JSON Schema validation for fetch-sparse configuration

use crate::error::FetchError;
use anyhow::{Result, anyhow};
use jsonschema::Validator;
use serde_json::Value;

/// Compile the embedded JSON schema for fetch-sparse configuration
pub fn get_schema() -> Result<Validator> {
    let schema_str = include_str!("../../docs/schema.json");
    let schema: Value = serde_json::from_str(schema_str)
        .map_err(|e| anyhow!("Failed to parse embedded JSON schema: {}", e))?;

    jsonschema::validator_for(&schema)
        .map_err(|e| anyhow!("Failed to compile JSON schema: {}", e))
}

/// Validate a configuration value against the schema
pub fn validate_against_schema(config: &Value) -> Result<()> {
    let schema = get_schema()?;

    let error_messages: Vec<String> = schema
        .iter_errors(config)
        .map(|e| format!("  - Path '{}': {}", e.instance_path, e))
        .collect();

    if !error_messages.is_empty() {
        return Err(FetchError::config(format!(
            "Configuration validation failed:\n{}",
            error_messages.join("\n")
        ))
        .into());
    }

    Ok(())
}
