//! JSON Schema validation for valuegraft options files

use anyhow::{Result, anyhow};
use jsonschema::{Draft, Validator};
use serde_json::Value;

/// Get the embedded JSON schema for options files
///
/// # Errors
///
/// Returns an error if:
/// - The embedded schema is not valid JSON or not a valid schema
#[inline]
pub fn get_schema() -> Result<Validator> {
    let schema_str = include_str!("../../docs/schema.json");
    let schema: Value = serde_json::from_str(schema_str)
        .map_err(|e| anyhow!("Failed to parse embedded JSON schema: {e}"))?;

    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&schema)
        .map_err(|e| anyhow!("Failed to compile JSON schema: {e}"))
}

/// Validate an options document against the schema
///
/// # Errors
///
/// Returns an error if:
/// - The schema cannot be loaded
/// - The document violates the schema
#[inline]
pub fn validate_against_schema(options: &Value) -> Result<()> {
    let schema = get_schema()?;

    let error_messages: Vec<String> = schema
        .iter_errors(options)
        .map(|e| format!("  - {e}"))
        .collect();

    if !error_messages.is_empty() {
        return Err(anyhow!(
            "Options validation failed:\n{}",
            error_messages.join("\n")
        ));
    }

    Ok(())
}
