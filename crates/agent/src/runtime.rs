//! The orchestration loop: a bounded state machine driving one run.
//!
//! Each iteration sends the accumulated turns, then branches on the response:
//! a mode-matching terminal call is validated and ends the run; intermediate
//! calls are executed and fed back as tool results in request order; a
//! text-only response earns a corrective reprompt. The iteration budget is
//! the liveness guarantee - the loop can fail, but it cannot hang.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use fabquote_core::{
    allowed_tools, has_questions, output_schema, validate, JobContext, QuoteMode,
    SchemaValidationError, ToolKind, UnknownModeError,
};

use crate::gate::capabilities_for;
use crate::llm::{ConversationTurn, LlmTransport, ToolCallRequest};
use crate::prompt::{PromptError, PromptRenderer};
use crate::tools::ToolExecutor;

pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Successful outcome of a run. `payload` conforms to the active mode's
/// schema; `has_questions` is true iff the model asked for more information
/// through the `questions` escape hatch.
#[derive(Clone, Debug, PartialEq)]
pub struct OrchestrationResult {
    pub payload: Value,
    pub has_questions: bool,
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    UnknownMode(#[from] UnknownModeError),
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),
    #[error("model never called `{expected_capability}` within {iterations} iterations")]
    ProtocolExhausted { expected_capability: &'static str, iterations: u32 },
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("llm transport failure: {0}")]
    Transport(#[source] anyhow::Error),
}

/// Drives bounded orchestration runs. Holds no per-run state; two runs may
/// execute concurrently on separate tasks with no coordination.
pub struct QuoteModeController {
    renderer: PromptRenderer,
    max_iterations: u32,
}

impl Default for QuoteModeController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl QuoteModeController {
    pub fn new(max_iterations: u32) -> Self {
        Self { renderer: PromptRenderer::new(), max_iterations }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run one orchestration: drive the transport until the mode's terminal
    /// capability is called with a valid payload, or the iteration budget is
    /// exhausted.
    ///
    /// `chat_history` seeds the conversation; the caller owns persistence.
    /// Transport failures propagate unmodified; tool-executor failures are
    /// absorbed into the conversation as error-string tool results.
    pub async fn run(
        &self,
        mode: QuoteMode,
        user_input: &str,
        job_context: Option<&JobContext>,
        transport: &dyn LlmTransport,
        tools: &dyn ToolExecutor,
        chat_history: &[ConversationTurn],
    ) -> Result<OrchestrationResult, OrchestrationError> {
        let correlation_id = Uuid::new_v4();
        let expected_capability = mode.terminal_capability();
        let capabilities = capabilities_for(mode);

        let prompt = self.renderer.render(mode, user_input, job_context, output_schema(mode))?;
        let mut turns: Vec<ConversationTurn> = chat_history.to_vec();
        turns.push(ConversationTurn::user(prompt));

        info!(
            event_name = "quote_mode.run_started",
            correlation_id = %correlation_id,
            mode = %mode,
            history_turns = chat_history.len(),
            max_iterations = self.max_iterations,
            "orchestration run started"
        );

        let mut consecutive_text_only = 0u32;

        for iteration in 1..=self.max_iterations {
            let response = transport
                .send(&turns, &capabilities)
                .await
                .map_err(OrchestrationError::Transport)?;

            debug!(
                event_name = "quote_mode.response_received",
                correlation_id = %correlation_id,
                mode = %mode,
                iteration,
                invocation_requests = response.invocation_requests.len(),
                has_text = response.text.is_some(),
                "model response received"
            );

            if let Some(terminal) = response
                .invocation_requests
                .iter()
                .find(|request| request.capability_name == expected_capability)
            {
                let payload = Value::Object(terminal.arguments.clone());
                if let Err(error) = validate(&payload, mode) {
                    warn!(
                        event_name = "quote_mode.payload_rejected",
                        correlation_id = %correlation_id,
                        mode = %mode,
                        iteration,
                        error = %error,
                        "terminal payload failed schema validation"
                    );
                    return Err(error.into());
                }

                let questions = has_questions(&payload);
                info!(
                    event_name = "quote_mode.run_completed",
                    correlation_id = %correlation_id,
                    mode = %mode,
                    iteration,
                    has_questions = questions,
                    "orchestration run completed"
                );
                return Ok(OrchestrationResult { payload, has_questions: questions });
            }

            if response.has_invocations() {
                consecutive_text_only = 0;
                let requests = response.invocation_requests.clone();
                turns.push(ConversationTurn::assistant(response.text.clone(), requests.clone()));

                for request in requests {
                    let result = self
                        .execute_request(mode, &request, tools, &correlation_id, iteration)
                        .await;
                    turns.push(ConversationTurn::tool_result(
                        request.request_id,
                        request.capability_name,
                        result,
                    ));
                }
                continue;
            }

            // Pure text: the model explained instead of acting. Re-prompt
            // toward the contract, escalating on the second consecutive miss;
            // the shared iteration budget still bounds this branch.
            consecutive_text_only += 1;
            turns.push(ConversationTurn::assistant(response.text, Vec::new()));

            let corrective = if consecutive_text_only == 1 {
                format!(
                    "Reminder: respond by calling the `{expected_capability}` capability with \
                     the structured payload. Do not reply in plain text."
                )
            } else {
                format!(
                    "You MUST call `{expected_capability}` now. If information is missing, call \
                     it with your outstanding questions in the `questions` array."
                )
            };

            warn!(
                event_name = "quote_mode.corrective_reprompt",
                correlation_id = %correlation_id,
                mode = %mode,
                iteration,
                consecutive_text_only,
                "model replied with text only, re-prompting toward the emit capability"
            );
            turns.push(ConversationTurn::user(corrective));
        }

        warn!(
            event_name = "quote_mode.run_exhausted",
            correlation_id = %correlation_id,
            mode = %mode,
            iterations = self.max_iterations,
            expected_capability,
            "iteration budget exhausted without a terminal call"
        );
        Err(OrchestrationError::ProtocolExhausted {
            expected_capability,
            iterations: self.max_iterations,
        })
    }

    /// Execute one intermediate invocation request. Never fails: unknown or
    /// out-of-mode capabilities and executor errors all become error-string
    /// results the model can read and correct against.
    async fn execute_request(
        &self,
        mode: QuoteMode,
        request: &ToolCallRequest,
        tools: &dyn ToolExecutor,
        correlation_id: &Uuid,
        iteration: u32,
    ) -> String {
        let resolved = ToolKind::from_name(&request.capability_name)
            .filter(|kind| allowed_tools(mode).contains(kind));

        let Some(kind) = resolved else {
            warn!(
                event_name = "quote_mode.capability_rejected",
                correlation_id = %correlation_id,
                mode = %mode,
                iteration,
                capability = %request.capability_name,
                "model requested a capability outside the active mode"
            );
            return format!(
                "capability `{}` is not available in {mode} mode; available capabilities: {}, {}",
                request.capability_name,
                allowed_tools(mode)
                    .iter()
                    .map(|kind| kind.name())
                    .collect::<Vec<_>>()
                    .join(", "),
                mode.terminal_capability(),
            );
        };

        match tools.execute(kind, &request.arguments).await {
            Ok(result) => {
                debug!(
                    event_name = "quote_mode.tool_executed",
                    correlation_id = %correlation_id,
                    mode = %mode,
                    iteration,
                    capability = kind.name(),
                    "intermediate capability executed"
                );
                result
            }
            Err(error) => {
                warn!(
                    event_name = "quote_mode.tool_failed",
                    correlation_id = %correlation_id,
                    mode = %mode,
                    iteration,
                    capability = kind.name(),
                    error = %error,
                    "intermediate capability failed, feeding error back to the model"
                );
                format!("tool `{}` failed: {error}", kind.name())
            }
        }
    }
}
