use fabquote_core::{output_schema, QuoteMode};

use crate::commands::CommandResult;

pub fn run(mode: &str) -> CommandResult {
    let mode = match mode.parse::<QuoteMode>() {
        Ok(mode) => mode,
        Err(error) => return CommandResult::failure("schema", "unknown_mode", error.to_string(), 2),
    };

    let output = serde_json::to_string_pretty(output_schema(mode)).unwrap_or_else(|error| {
        format!("{{\"command\":\"schema\",\"status\":\"error\",\"message\":\"{error}\"}}")
    });
    CommandResult { exit_code: 0, output }
}
