//! Quote Mode Controller - orchestration runtime
//!
//! This crate drives a constrained, bounded conversation with an LLM to
//! produce one of three strictly-typed structured outputs (a calculation, a
//! priced material list, or a finalized quote table):
//! - **Transport contract** (`llm`) - turns, invocation requests, and the
//!   `LlmTransport` seam; any provider normalizes its wire shape here
//! - **Capability gate** (`gate`) - the per-mode invocable capability set,
//!   intermediate tools plus exactly one terminal emit capability
//! - **Prompt renderer** (`prompt`) - deterministic instruction text
//!   embedding the active schema and job context
//! - **Tool seam** (`tools`) - executor trait for intermediate lookups
//! - **Orchestration loop** (`runtime`) - the bounded state machine that
//!   sends turns, executes intermediate calls, and validates the terminal
//!   payload before trusting it
//! - **HTTP transport** (`openai`) - OpenAI-compatible chat-completions
//!   implementation of the transport contract
//!
//! # Safety Principle
//!
//! Model responses are unreliable inputs: they may omit the required emit
//! call, call out-of-mode capabilities, or emit malformed payloads. The loop
//! is the disciplined half of the protocol - it always re-prompts toward the
//! contract, always bounds the interaction, and always validates before
//! returning a payload.

pub mod gate;
pub mod llm;
pub mod openai;
pub mod prompt;
pub mod runtime;
pub mod tools;

pub use gate::{capabilities_for, terminal_descriptor};
pub use llm::{ConversationTurn, LlmTransport, ModelResponse, ToolCallRequest, TurnRole};
pub use openai::OpenAiChatTransport;
pub use prompt::{PromptError, PromptRenderer};
pub use runtime::{
    OrchestrationError, OrchestrationResult, QuoteModeController, DEFAULT_MAX_ITERATIONS,
};
pub use tools::ToolExecutor;
