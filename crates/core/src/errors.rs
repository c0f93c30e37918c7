use thiserror::Error;

/// A mode string outside the accepted set reached the controller boundary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown quote mode `{supplied}` (expected calc|price|table)")]
pub struct UnknownModeError {
    pub supplied: String,
}

impl UnknownModeError {
    pub fn new(supplied: impl Into<String>) -> Self {
        Self { supplied: supplied.into() }
    }
}

/// One structural defect found while validating an emitted payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Dotted path into the payload, `$` for the root.
    pub location: String,
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// The terminal payload failed structural validation against the active
/// mode's output schema. Fatal for the run; the payload is never coerced.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("payload failed `{schema}` schema validation: {}", render_violations(.violations))]
pub struct SchemaValidationError {
    /// Terminal capability name of the schema the payload was checked against.
    pub schema: &'static str,
    pub violations: Vec<SchemaViolation>,
}

fn render_violations(violations: &[SchemaViolation]) -> String {
    if violations.is_empty() {
        return "no details recorded".to_string();
    }
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[cfg(test)]
mod tests {
    use super::{SchemaValidationError, SchemaViolation, UnknownModeError};

    #[test]
    fn unknown_mode_names_the_valid_set() {
        let error = UnknownModeError::new("pricing");
        let message = error.to_string();
        assert!(message.contains("`pricing`"));
        assert!(message.contains("calc|price|table"));
    }

    #[test]
    fn validation_error_lists_each_violation() {
        let error = SchemaValidationError {
            schema: "emit_calc_result",
            violations: vec![
                SchemaViolation {
                    location: "$.summary".to_string(),
                    message: "expected string, found number".to_string(),
                },
                SchemaViolation {
                    location: "$".to_string(),
                    message: "missing required key `questions`".to_string(),
                },
            ],
        };

        let message = error.to_string();
        assert!(message.contains("emit_calc_result"));
        assert!(message.contains("$.summary: expected string, found number"));
        assert!(message.contains("missing required key `questions`"));
    }
}
