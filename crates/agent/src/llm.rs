//! Transport contract between the orchestration loop and any LLM provider.
//!
//! Whatever the provider's native response shape, the transport
//! implementation normalizes it into [`ModelResponse`] before the loop sees
//! it; the loop never branches on vendor types.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use fabquote_core::CapabilityDescriptor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
    Tool,
}

/// One turn of an orchestration conversation. Turns live only in memory for
/// the duration of a run; persistence is the caller's responsibility.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: Option<String>,
    /// Capability invocations requested by the model on assistant turns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invocations: Vec<ToolCallRequest>,
    /// On tool turns: the request this result answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// On tool turns: the capability that produced the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: Some(content.into()),
            invocations: Vec::new(),
            request_id: None,
            capability: None,
        }
    }

    pub fn assistant(content: Option<String>, invocations: Vec<ToolCallRequest>) -> Self {
        Self { role: TurnRole::Assistant, content, invocations, request_id: None, capability: None }
    }

    pub fn tool_result(
        request_id: impl Into<String>,
        capability: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: TurnRole::Tool,
            content: Some(content.into()),
            invocations: Vec::new(),
            request_id: Some(request_id.into()),
            capability: Some(capability.into()),
        }
    }
}

/// A capability invocation requested by the model inside one response. Zero
/// or more may appear per response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub capability_name: String,
    pub arguments: Map<String, Value>,
    pub request_id: String,
}

/// Provider-agnostic model response: free text, capability invocation
/// requests, or both.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub invocation_requests: Vec<ToolCallRequest>,
}

impl ModelResponse {
    pub fn has_invocations(&self) -> bool {
        !self.invocation_requests.is_empty()
    }
}

/// Chat-completion client able to carry prior turns and a constrained
/// capability list. Transport failures (network, provider) surface as-is;
/// retry policy belongs to the transport or the caller, not the loop.
#[async_trait]
pub trait LlmTransport: Send + Sync {
    async fn send(
        &self,
        turns: &[ConversationTurn],
        capabilities: &[CapabilityDescriptor],
    ) -> Result<ModelResponse>;
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::{ConversationTurn, ModelResponse, ToolCallRequest, TurnRole};

    #[test]
    fn turn_constructors_set_roles() {
        assert_eq!(ConversationTurn::user("hi").role, TurnRole::User);
        assert_eq!(ConversationTurn::assistant(None, Vec::new()).role, TurnRole::Assistant);

        let tool = ConversationTurn::tool_result("call_1", "material_search", "no matches");
        assert_eq!(tool.role, TurnRole::Tool);
        assert_eq!(tool.request_id.as_deref(), Some("call_1"));
        assert_eq!(tool.capability.as_deref(), Some("material_search"));
    }

    #[test]
    fn response_reports_invocations() {
        assert!(!ModelResponse::default().has_invocations());

        let response = ModelResponse {
            text: None,
            invocation_requests: vec![ToolCallRequest {
                capability_name: "material_search".to_string(),
                arguments: Map::new(),
                request_id: "call_1".to_string(),
            }],
        };
        assert!(response.has_invocations());
    }
}
