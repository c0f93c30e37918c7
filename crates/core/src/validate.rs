//! Structural payload validation against the mode schemas.
//!
//! Validation never coerces: a string where a number is required is a
//! violation, not a cast. This keeps "model produced the wrong type"
//! distinguishable from "model produced an acceptable but empty result".

use serde_json::Value;

use crate::errors::{SchemaValidationError, SchemaViolation};
use crate::mode::QuoteMode;
use crate::schema::output_schema;

/// Validate `payload` against the output schema for `mode`.
///
/// Checks required keys, value types, and nested array/object shapes per the
/// schema document. All violations are collected before failing so one error
/// reports everything wrong with the payload.
pub fn validate(payload: &Value, mode: QuoteMode) -> Result<(), SchemaValidationError> {
    let mut violations = Vec::new();
    check_value(payload, output_schema(mode), "$", &mut violations);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaValidationError { schema: mode.terminal_capability(), violations })
    }
}

/// True iff `payload.questions` is a non-empty array: the model needs more
/// information before it can produce a complete result.
pub fn has_questions(payload: &Value) -> bool {
    payload
        .get("questions")
        .and_then(Value::as_array)
        .map(|questions| !questions.is_empty())
        .unwrap_or(false)
}

fn check_value(value: &Value, schema: &Value, path: &str, violations: &mut Vec<SchemaViolation>) {
    let Some(expected_type) = schema.get("type").and_then(Value::as_str) else {
        return;
    };

    match expected_type {
        "object" => check_object(value, schema, path, violations),
        "array" => check_array(value, schema, path, violations),
        "string" => {
            if !value.is_string() {
                violations.push(type_violation(path, "string", value));
            }
        }
        "number" => {
            if !value.is_number() {
                violations.push(type_violation(path, "number", value));
            }
        }
        "integer" => {
            if !value.is_i64() && !value.is_u64() {
                violations.push(type_violation(path, "integer", value));
            }
        }
        "boolean" => {
            if !value.is_boolean() {
                violations.push(type_violation(path, "boolean", value));
            }
        }
        _ => {}
    }
}

fn check_object(value: &Value, schema: &Value, path: &str, violations: &mut Vec<SchemaViolation>) {
    let Some(object) = value.as_object() else {
        violations.push(type_violation(path, "object", value));
        return;
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(key) {
                violations.push(SchemaViolation {
                    location: path.to_string(),
                    message: format!("missing required key `{key}`"),
                });
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };

    for (key, property_schema) in properties {
        if let Some(property_value) = object.get(key) {
            check_value(property_value, property_schema, &format!("{path}.{key}"), violations);
        }
    }
}

fn check_array(value: &Value, schema: &Value, path: &str, violations: &mut Vec<SchemaViolation>) {
    let Some(items) = value.as_array() else {
        violations.push(type_violation(path, "array", value));
        return;
    };

    if let Some(min_items) = schema.get("minItems").and_then(Value::as_u64) {
        if (items.len() as u64) < min_items {
            violations.push(SchemaViolation {
                location: path.to_string(),
                message: format!("expected at least {min_items} item(s), found {}", items.len()),
            });
        }
    }

    if let Some(max_items) = schema.get("maxItems").and_then(Value::as_u64) {
        if (items.len() as u64) > max_items {
            violations.push(SchemaViolation {
                location: path.to_string(),
                message: format!("expected at most {max_items} item(s), found {}", items.len()),
            });
        }
    }

    if let Some(item_schema) = schema.get("items") {
        for (index, item) in items.iter().enumerate() {
            check_value(item, item_schema, &format!("{path}[{index}]"), violations);
        }
    }
}

fn type_violation(path: &str, expected: &str, found: &Value) -> SchemaViolation {
    SchemaViolation {
        location: path.to_string(),
        message: format!("expected {expected}, found {}", type_name(found)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
