use fabquote_core::{infer_mode, QuoteMode};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct InferReport {
    command: &'static str,
    status: &'static str,
    mode: String,
    confidence: f64,
}

pub fn run(text: &str, previous: Option<&str>) -> CommandResult {
    let previous_mode = match previous {
        Some(raw) => match raw.parse::<QuoteMode>() {
            Ok(mode) => Some(mode),
            Err(error) => {
                return CommandResult::failure("infer", "unknown_mode", error.to_string(), 2);
            }
        },
        None => None,
    };

    let inference = infer_mode(text, previous_mode);
    let report = InferReport {
        command: "infer",
        status: "ok",
        mode: inference.mode.to_string(),
        confidence: inference.confidence,
    };

    let output = serde_json::to_string(&report)
        .unwrap_or_else(|error| format!("{{\"command\":\"infer\",\"status\":\"error\",\"message\":\"{error}\"}}"));
    CommandResult { exit_code: 0, output }
}
