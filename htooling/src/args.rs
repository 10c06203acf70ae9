//! Argument extraction for tools that take a JSON object.
//!
//! ```rust
//! use htooling::{optional_u64, parse_json_object, required_string};
//!
//! let args = parse_json_object(r#"{"query":"rust","max_results":3}"#).expect("object should parse");
//! assert_eq!(required_string(&args, "query").expect("query should be present"), "rust");
//! assert_eq!(optional_u64(&args, "max_results").expect("count should parse"), Some(3));
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

/// Blank input is treated as an empty object.
pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    if args_json.trim().is_empty() {
        return Ok(Map::new());
    }

    match parse_json_value(args_json)? {
        Value::Object(map) => Ok(map),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    optional_string(args, key)?
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn optional_string(args: &Map<String, Value>, key: &str) -> Result<Option<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ToolError::invalid_arguments(format!(
            "'{key}' must be a string"
        ))),
    }
}

pub fn optional_u64(args: &Map<String, Value>, key: &str) -> Result<Option<u64>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            ToolError::invalid_arguments(format!("'{key}' must be a non-negative integer"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolErrorKind;

    #[test]
    fn blank_required_string_is_rejected() {
        let args = parse_json_object(r#"{"query":"  "}"#).expect("args should parse");
        let error = required_string(&args, "query").expect_err("blank query should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn invalid_json_and_non_objects_are_rejected() {
        let error = parse_json_value("{").expect_err("json should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);

        let error = parse_json_object("[1, 2]").expect_err("array should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn optional_fields_accept_absent_and_null() {
        let args = parse_json_object(r#"{"voice":null}"#).expect("args should parse");
        assert_eq!(optional_string(&args, "voice").expect("null is absent"), None);
        assert_eq!(optional_u64(&args, "max_results").expect("absent is fine"), None);
        assert!(parse_json_object("").expect("blank is empty").is_empty());
    }

    #[test]
    fn wrong_types_are_reported() {
        let args = parse_json_object(r#"{"max_results":"five","language":3}"#)
            .expect("args should parse");
        assert!(optional_u64(&args, "max_results").is_err());
        assert!(optional_string(&args, "language").is_err());
    }
}
