use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

use fabquote_core::ToolKind;

/// Executes intermediate capabilities on behalf of the orchestration loop.
///
/// Executors perform side-effect-free lookups and never touch controller
/// state. A failed execution is absorbed at the call site and fed back to the
/// model as an error-string tool result, so implementations are free to
/// return errors for bad arguments or unavailable backends.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, tool: ToolKind, arguments: &Map<String, Value>) -> Result<String>;
}
