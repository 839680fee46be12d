//! Local validation of free-form JSON fields

use thiserror::Error;

/// A field-level validation message. Never sent to the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Parse free-form JSON typed into `field`.
///
/// Blank input is an empty object.
pub fn parse_json_field(field: &str, input: &str) -> Result<serde_json::Value, FieldError> {
    if input.trim().is_empty() {
        return Ok(serde_json::Value::Object(Default::default()));
    }
    serde_json::from_str(input).map_err(|e| FieldError {
        field: field.to_string(),
        message: format!(
            "Invalid JSON at line {}, column {}: {}",
            e.line(),
            e.column(),
            e
        ),
    })
}

/// Parse a properties editor, which must hold a JSON object.
pub fn parse_properties(
    field: &str,
    input: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, FieldError> {
    match parse_json_field(field, input)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(FieldError {
            field: field.to_string(),
            message: "Must be a JSON object".to_string(),
        }),
    }
}
