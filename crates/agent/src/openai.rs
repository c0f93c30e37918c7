//! OpenAI-compatible chat-completions transport.
//!
//! Works against api.openai.com and Ollama's `/v1` compatibility endpoint.
//! All provider JSON is normalized into [`ModelResponse`] here; nothing
//! vendor-shaped leaves this module.

use std::time::Duration;

use anyhow::{anyhow, Context as _, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use fabquote_core::config::{LlmConfig, LlmProvider};
use fabquote_core::CapabilityDescriptor;

use crate::llm::{ConversationTurn, LlmTransport, ModelResponse, ToolCallRequest, TurnRole};

const OPENAI_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiChatTransport {
    client: Client,
    chat_url: String,
    api_key: Option<SecretString>,
    model: String,
    max_retries: u32,
}

impl OpenAiChatTransport {
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            chat_url: chat_url(base_url),
            api_key: None,
            model: model.into(),
            max_retries: 0,
        }
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("could not build http client for llm transport")?;

        let base_url = match config.provider {
            LlmProvider::OpenAi => {
                config.base_url.clone().unwrap_or_else(|| OPENAI_BASE_URL.to_string())
            }
            LlmProvider::Ollama => config
                .base_url
                .clone()
                .ok_or_else(|| anyhow!("llm.base_url is required for the ollama provider"))?,
        };

        Ok(Self {
            client,
            chat_url: chat_url(&base_url),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn send_once(&self, body: &Value) -> Result<Value> {
        let mut request = self.client.post(&self.chat_url).json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.context("chat completion request failed")?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "chat completion request returned {status}: {}",
                detail.chars().take(300).collect::<String>()
            ));
        }

        response.json().await.context("chat completion response was not valid JSON")
    }
}

#[async_trait]
impl LlmTransport for OpenAiChatTransport {
    async fn send(
        &self,
        turns: &[ConversationTurn],
        capabilities: &[CapabilityDescriptor],
    ) -> Result<ModelResponse> {
        let messages = build_messages(turns)?;
        let body = json!({
            "model": self.model,
            "messages": messages,
            "tools": build_tools(capabilities),
            "tool_choice": "auto",
        });

        let mut attempt = 0;
        let response_json = loop {
            match self.send_once(&body).await {
                Ok(response_json) => break response_json,
                Err(error) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        event_name = "quote_mode.transport_retry",
                        attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "chat completion attempt failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                }
                Err(error) => return Err(error),
            }
        };

        Ok(normalize_response(&response_json))
    }
}

fn chat_url(base_url: &str) -> String {
    format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
}

fn build_messages(turns: &[ConversationTurn]) -> Result<Vec<Value>> {
    turns.iter().map(build_message).collect()
}

fn build_message(turn: &ConversationTurn) -> Result<Value> {
    match turn.role {
        TurnRole::User => Ok(json!({
            "role": "user",
            "content": turn.content.as_deref().unwrap_or_default(),
        })),
        TurnRole::Assistant => {
            let mut message = json!({
                "role": "assistant",
                "content": turn.content.as_deref().unwrap_or_default(),
            });
            if !turn.invocations.is_empty() {
                let tool_calls = turn
                    .invocations
                    .iter()
                    .map(|invocation| {
                        let arguments = serde_json::to_string(&invocation.arguments)
                            .context("could not serialize tool call arguments")?;
                        Ok(json!({
                            "id": invocation.request_id,
                            "type": "function",
                            "function": {
                                "name": invocation.capability_name,
                                "arguments": arguments,
                            }
                        }))
                    })
                    .collect::<Result<Vec<Value>>>()?;
                message["tool_calls"] = Value::Array(tool_calls);
            }
            Ok(message)
        }
        TurnRole::Tool => Ok(json!({
            "role": "tool",
            "tool_call_id": turn.request_id.as_deref().unwrap_or_default(),
            "content": turn.content.as_deref().unwrap_or_default(),
        })),
    }
}

fn build_tools(capabilities: &[CapabilityDescriptor]) -> Vec<Value> {
    capabilities
        .iter()
        .map(|descriptor| {
            json!({
                "type": "function",
                "function": {
                    "name": descriptor.name,
                    "description": descriptor.description,
                    "parameters": descriptor.parameters,
                }
            })
        })
        .collect()
}

fn normalize_response(response_json: &Value) -> ModelResponse {
    let message = &response_json["choices"][0]["message"];

    let text = message["content"]
        .as_str()
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(ToString::to_string);

    let invocation_requests = match message["tool_calls"].as_array() {
        Some(tool_calls) => tool_calls
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let capability_name = item["function"]["name"].as_str()?.to_string();
                let request_id = item["id"]
                    .as_str()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| format!("tool_call_{}", index + 1));

                let raw_arguments = item["function"]["arguments"].as_str().unwrap_or("{}");
                let arguments = match serde_json::from_str::<Value>(raw_arguments) {
                    Ok(Value::Object(map)) => map,
                    _ => {
                        let mut map = serde_json::Map::new();
                        map.insert(
                            "raw_arguments".to_string(),
                            Value::String(raw_arguments.to_string()),
                        );
                        map
                    }
                };

                Some(ToolCallRequest { capability_name, arguments, request_id })
            })
            .collect(),
        None => Vec::new(),
    };

    ModelResponse { text, invocation_requests }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use fabquote_core::QuoteMode;

    use super::{build_message, build_tools, chat_url, normalize_response};
    use crate::gate::capabilities_for;
    use crate::llm::{ConversationTurn, ToolCallRequest};

    #[test]
    fn normalizes_tool_calls_from_the_wire_shape() {
        let payload = json!({
            "choices": [{
                "message": {
                    "content": "",
                    "tool_calls": [{
                        "id": "call_9",
                        "function": {
                            "name": "pricing_lookup",
                            "arguments": "{\"material\":\"AL-5052 3mm\"}"
                        }
                    }]
                }
            }]
        });

        let response = normalize_response(&payload);
        assert_eq!(response.text, None);
        assert_eq!(response.invocation_requests.len(), 1);
        assert_eq!(response.invocation_requests[0].capability_name, "pricing_lookup");
        assert_eq!(response.invocation_requests[0].request_id, "call_9");
        assert_eq!(response.invocation_requests[0].arguments["material"], "AL-5052 3mm");
    }

    #[test]
    fn malformed_argument_strings_are_preserved_not_dropped() {
        let payload = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "function": {
                            "name": "material_search",
                            "arguments": "not json"
                        }
                    }]
                }
            }]
        });

        let response = normalize_response(&payload);
        assert_eq!(response.invocation_requests.len(), 1);
        assert_eq!(response.invocation_requests[0].request_id, "tool_call_1");
        assert_eq!(response.invocation_requests[0].arguments["raw_arguments"], "not json");
    }

    #[test]
    fn text_only_responses_carry_trimmed_text() {
        let payload = json!({
            "choices": [{ "message": { "content": "  I need to think.  " } }]
        });

        let response = normalize_response(&payload);
        assert_eq!(response.text.as_deref(), Some("I need to think."));
        assert!(response.invocation_requests.is_empty());
    }

    #[test]
    fn assistant_turns_serialize_tool_calls_as_argument_strings() {
        let turn = ConversationTurn::assistant(
            None,
            vec![ToolCallRequest {
                capability_name: "sheet_nesting".to_string(),
                arguments: json!({ "quantity": 40 }).as_object().cloned().unwrap(),
                request_id: "call_2".to_string(),
            }],
        );

        let message = build_message(&turn).expect("build message");
        assert_eq!(message["role"], "assistant");
        assert_eq!(message["tool_calls"][0]["id"], "call_2");
        assert_eq!(message["tool_calls"][0]["function"]["name"], "sheet_nesting");
        assert_eq!(message["tool_calls"][0]["function"]["arguments"], "{\"quantity\":40}");
    }

    #[test]
    fn tool_turns_carry_the_answered_request_id() {
        let turn = ConversationTurn::tool_result("call_7", "material_search", "2 matches");
        let message = build_message(&turn).expect("build message");

        assert_eq!(message["role"], "tool");
        assert_eq!(message["tool_call_id"], "call_7");
        assert_eq!(message["content"], "2 matches");
    }

    #[test]
    fn capability_descriptors_become_function_tools() {
        let tools = build_tools(&capabilities_for(QuoteMode::Calc));
        assert_eq!(tools.len(), 3);
        for tool in &tools {
            assert_eq!(tool["type"], "function");
            assert!(tool["function"]["name"].is_string());
            assert!(tool["function"]["parameters"].is_object());
        }
    }

    #[test]
    fn chat_url_tolerates_trailing_slashes() {
        assert_eq!(
            chat_url("http://localhost:11434/"),
            "http://localhost:11434/v1/chat/completions"
        );
    }
}
