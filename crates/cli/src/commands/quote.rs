use fabquote_agent::{OpenAiChatTransport, OrchestrationError, QuoteModeController};
use fabquote_core::config::{AppConfig, LoadOptions};
use fabquote_core::{infer_mode, JobContext, QuoteMode};
use serde::Serialize;
use serde_json::Value;

use crate::commands::CommandResult;
use crate::demo::DemoToolExecutor;

#[derive(Debug, Serialize)]
struct QuoteReport {
    command: &'static str,
    status: &'static str,
    mode: String,
    has_questions: bool,
    payload: Value,
}

pub fn run(
    text: &str,
    mode: Option<&str>,
    job_number: Option<&str>,
    client: Option<&str>,
    description: Option<&str>,
) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("quote", "config_validation", error.to_string(), 2);
        }
    };

    let mode = match mode {
        Some(raw) => match raw.parse::<QuoteMode>() {
            Ok(mode) => mode,
            Err(error) => {
                return CommandResult::failure("quote", "unknown_mode", error.to_string(), 2);
            }
        },
        None => infer_mode(text, None).mode,
    };

    let transport = match OpenAiChatTransport::from_config(&config.llm) {
        Ok(transport) => transport,
        Err(error) => {
            return CommandResult::failure("quote", "transport_init", error.to_string(), 3);
        }
    };

    let job_context = match (job_number, client, description) {
        (Some(job_number), Some(client), Some(description)) => {
            Some(JobContext::new(job_number, client, description))
        }
        _ => None,
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("quote", "runtime_init", error.to_string(), 3),
    };

    let controller = QuoteModeController::new(config.controller.max_iterations);
    let outcome = runtime.block_on(controller.run(
        mode,
        text,
        job_context.as_ref(),
        &transport,
        &DemoToolExecutor,
        &[],
    ));

    match outcome {
        Ok(result) => {
            let report = QuoteReport {
                command: "quote",
                status: "ok",
                mode: mode.to_string(),
                has_questions: result.has_questions,
                payload: result.payload,
            };
            let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
                format!("{{\"command\":\"quote\",\"status\":\"error\",\"message\":\"{error}\"}}")
            });
            CommandResult { exit_code: 0, output }
        }
        Err(error) => {
            CommandResult::failure("quote", error_class(&error), error.to_string(), 1)
        }
    }
}

fn error_class(error: &OrchestrationError) -> &'static str {
    match error {
        OrchestrationError::UnknownMode(_) => "unknown_mode",
        OrchestrationError::SchemaValidation(_) => "schema_validation",
        OrchestrationError::ProtocolExhausted { .. } => "protocol_exhausted",
        OrchestrationError::Prompt(_) => "prompt_template",
        OrchestrationError::Transport(_) => "transport",
    }
}
