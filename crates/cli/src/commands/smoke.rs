use std::time::Instant;

use fabquote_agent::{
    ModelResponse, OrchestrationError, QuoteModeController, ToolCallRequest,
};
use fabquote_core::config::{AppConfig, LoadOptions};
use fabquote_core::QuoteMode;
use serde::Serialize;
use serde_json::{json, Value};

use crate::commands::CommandResult;
use crate::demo::{DemoToolExecutor, ScriptedTransport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

pub fn run() -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config_check_started = Instant::now();
    match AppConfig::load(LoadOptions::default()) {
        Ok(_) => checks.push(SmokeCheck {
            name: "config_validation",
            status: SmokeStatus::Pass,
            elapsed_ms: config_check_started.elapsed().as_millis() as u64,
            message: "configuration loaded and validated".to_string(),
        }),
        Err(error) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Fail,
                elapsed_ms: config_check_started.elapsed().as_millis() as u64,
                message: error.to_string(),
            });
            checks.push(skipped("calc_happy_path"));
            checks.push(skipped("exhaustion_guard"));
            checks.push(skipped("cross_mode_rejection"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            checks.push(SmokeCheck {
                name: "calc_happy_path",
                status: SmokeStatus::Fail,
                elapsed_ms: 0,
                message: format!("could not build tokio runtime: {error}"),
            });
            checks.push(skipped("exhaustion_guard"));
            checks.push(skipped("cross_mode_rejection"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    runtime.block_on(async {
        checks.push(timed("calc_happy_path", check_calc_happy_path()).await);
        checks.push(timed("exhaustion_guard", check_exhaustion_guard()).await);
        checks.push(timed("cross_mode_rejection", check_cross_mode_rejection()).await);
    });

    finalize_report(checks, started.elapsed().as_millis() as u64)
}

/// Intermediate nesting call, then a valid terminal payload: the controller
/// must finish in two iterations with a complete result.
async fn check_calc_happy_path() -> Result<String, String> {
    let transport = ScriptedTransport::new(
        vec![
            invocation_response(
                "sheet_nesting",
                json!({ "part_width_mm": 100, "part_height_mm": 50, "quantity": 40 }),
                "call_1",
            ),
            invocation_response(
                QuoteMode::Calc.terminal_capability(),
                json!({
                    "summary": "40 parts fit on a single 2400x1200 sheet.",
                    "results": [{ "label": "sheets_required", "value": 1, "unit": "sheets" }],
                    "assumptions": ["2mm kerf"],
                    "questions": []
                }),
                "call_2",
            ),
        ],
        text_response("script exhausted"),
    );

    let controller = QuoteModeController::new(4);
    let result = controller
        .run(QuoteMode::Calc, "How many sheets for 40 parts at 100x50mm?", None, &transport,
            &DemoToolExecutor, &[])
        .await
        .map_err(|error| format!("orchestration failed: {error}"))?;

    if result.has_questions {
        return Err("expected a complete result, got questions".to_string());
    }
    Ok("terminal payload accepted after one tool round trip".to_string())
}

/// A model that only ever explains must exhaust the budget, never hang.
async fn check_exhaustion_guard() -> Result<String, String> {
    let transport = ScriptedTransport::new(Vec::new(), text_response("let me think about it"));
    let controller = QuoteModeController::new(2);

    let error = controller
        .run(QuoteMode::Price, "price this up", None, &transport, &DemoToolExecutor, &[])
        .await
        .err()
        .ok_or_else(|| "text-only transport unexpectedly produced a payload".to_string())?;

    match error {
        OrchestrationError::ProtocolExhausted { expected_capability, iterations } => Ok(format!(
            "exhausted after {iterations} iterations waiting for `{expected_capability}`"
        )),
        other => Err(format!("expected protocol exhaustion, got: {other}")),
    }
}

/// A PRICE-shaped terminal call during a CALC run must never be accepted.
async fn check_cross_mode_rejection() -> Result<String, String> {
    let transport = ScriptedTransport::new(
        Vec::new(),
        invocation_response(
            QuoteMode::Price.terminal_capability(),
            json!({ "materials": [], "currency": "AUD", "subtotal": 0.0, "questions": [] }),
            "call_1",
        ),
    );
    let controller = QuoteModeController::new(2);

    let outcome = controller
        .run(QuoteMode::Calc, "calculate sheets", None, &transport, &DemoToolExecutor, &[])
        .await;

    match outcome {
        Ok(_) => Err("wrong-mode terminal call was accepted as a payload".to_string()),
        Err(OrchestrationError::ProtocolExhausted { .. }) => {
            Ok("wrong-mode terminal call was rejected and the run bounded out".to_string())
        }
        Err(other) => Err(format!("expected protocol exhaustion, got: {other}")),
    }
}

fn invocation_response(capability: &str, arguments: Value, request_id: &str) -> ModelResponse {
    ModelResponse {
        text: None,
        invocation_requests: vec![ToolCallRequest {
            capability_name: capability.to_string(),
            arguments: arguments.as_object().cloned().unwrap_or_default(),
            request_id: request_id.to_string(),
        }],
    }
}

fn text_response(text: &str) -> ModelResponse {
    ModelResponse { text: Some(text.to_string()), invocation_requests: Vec::new() }
}

async fn timed(
    name: &'static str,
    check: impl std::future::Future<Output = Result<String, String>>,
) -> SmokeCheck {
    let started = Instant::now();
    let outcome = check.await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(message) => SmokeCheck { name, status: SmokeStatus::Pass, elapsed_ms, message },
        Err(message) => SmokeCheck { name, status: SmokeStatus::Fail, elapsed_ms, message },
    }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due to earlier failure".to_string(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let failed = checks.iter().filter(|check| check.status == SmokeStatus::Fail).count();
    let status = if failed == 0 { SmokeStatus::Pass } else { SmokeStatus::Fail };
    let summary = if failed == 0 {
        format!("{} checks passed", checks.len())
    } else {
        format!("{failed} of {} checks failed", checks.len())
    };

    let report =
        SmokeReport { command: "smoke", status, summary, total_elapsed_ms, checks };
    let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
        format!("{{\"command\":\"smoke\",\"status\":\"fail\",\"message\":\"{error}\"}}")
    });

    CommandResult { exit_code: if failed == 0 { 0 } else { 1 }, output }
}
