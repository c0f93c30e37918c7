use fabquote_agent::capabilities_for;
use fabquote_core::QuoteMode;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct CapabilityRow {
    name: String,
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct CapabilitiesReport {
    command: &'static str,
    status: &'static str,
    mode: String,
    capabilities: Vec<CapabilityRow>,
}

pub fn run(mode: &str) -> CommandResult {
    let mode = match mode.parse::<QuoteMode>() {
        Ok(mode) => mode,
        Err(error) => {
            return CommandResult::failure("capabilities", "unknown_mode", error.to_string(), 2);
        }
    };

    let terminal_name = mode.terminal_capability();
    let capabilities = capabilities_for(mode)
        .into_iter()
        .map(|descriptor| CapabilityRow {
            kind: if descriptor.name == terminal_name { "terminal" } else { "intermediate" },
            name: descriptor.name,
        })
        .collect();

    let report = CapabilitiesReport {
        command: "capabilities",
        status: "ok",
        mode: mode.to_string(),
        capabilities,
    };

    let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
        format!("{{\"command\":\"capabilities\",\"status\":\"error\",\"message\":\"{error}\"}}")
    });
    CommandResult { exit_code: 0, output }
}
