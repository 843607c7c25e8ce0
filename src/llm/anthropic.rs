//! Anthropic Messages API provider.
//!
//! Talks to the Messages API directly over `reqwest`. System messages are
//! lifted into the request's `system` field, which the API requires to be
//! separate from the user/assistant turn list.

use super::{ChatMessage, LlmProvider, Role};
use crate::error::{FragaError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize, PartialEq)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Anthropic-backed LLM provider.
pub struct AnthropicProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    /// Create a provider for the given credential and model.
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Build the wire request, splitting system messages from the turn list.
    fn build_request(&self, messages: &[ChatMessage]) -> MessagesRequest {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let turns = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| WireMessage {
                role: match m.role {
                    Role::User => "user",
                    _ => "assistant",
                },
                content: m.content.clone(),
            })
            .collect();

        MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: if system.is_empty() {
                None
            } else {
                Some(system.join("\n\n"))
            },
            messages: turns,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages), fields(count = messages.len()))]
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = self.build_request(messages);

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| FragaError::Provider(format!("Anthropic request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FragaError::Provider(format!(
                "Anthropic API returned {}: {}",
                status, body
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| FragaError::Provider(format!("Invalid Anthropic response: {}", e)))?;

        let answer = parsed
            .content
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        if answer.is_empty() {
            return Err(FragaError::Provider(
                "Empty response from Anthropic".to_string(),
            ));
        }

        debug!("Received {} characters from Anthropic", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new("test-key", "claude-3-5-sonnet-latest").unwrap()
    }

    #[test]
    fn test_system_messages_lifted_out_of_turns() {
        let request = provider().build_request(&[
            ChatMessage::system("You answer documentation questions."),
            ChatMessage::user("How do I add a field?"),
            ChatMessage::assistant("Use the form editor."),
            ChatMessage::user("Show me code."),
        ]);

        assert_eq!(
            request.system.as_deref(),
            Some("You answer documentation questions.")
        );
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.messages[1].role, "assistant");
    }

    #[test]
    fn test_no_system_field_without_system_messages() {
        let request = provider().build_request(&[ChatMessage::user("hello")]);
        assert!(request.system.is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["max_tokens"], 4096);
    }
}
