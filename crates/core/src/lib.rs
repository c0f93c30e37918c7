//! Quote Mode Controller - core types and pure logic
//!
//! This crate holds everything the orchestration runtime depends on that does
//! not talk to the outside world:
//! - Operating modes and the schema registry (`mode`, `schema`)
//! - The closed capability set models may invoke (`capability`)
//! - Heuristic mode inference from free text (`inference`)
//! - Structural payload validation and questions classification (`validate`)
//! - Job context carried into prompts (`job`)
//! - Configuration loading and validation (`config`)
//!
//! # Safety Principle
//!
//! The LLM is strictly a producer of structured payloads. It NEVER widens its
//! own capability set and NEVER ends a run except through the mode's emit
//! capability, validated here. Everything in this crate is deterministic.

pub mod capability;
pub mod config;
pub mod errors;
pub mod inference;
pub mod job;
pub mod mode;
pub mod schema;
pub mod validate;

pub use capability::{CapabilityDescriptor, ToolKind};
pub use errors::{SchemaValidationError, SchemaViolation, UnknownModeError};
pub use inference::{infer_mode, ModeInference};
pub use job::JobContext;
pub use mode::QuoteMode;
pub use schema::{allowed_tools, output_schema, MAX_QUESTIONS};
pub use validate::{has_questions, validate};
