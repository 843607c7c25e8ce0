//! OpenAI chat completion provider.

use super::{ChatMessage, LlmProvider, Role};
use crate::error::{FragaError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 300;

/// OpenAI-backed LLM provider.
pub struct OpenAiProvider {
    client: async_openai::Client<OpenAIConfig>,
    model: String,
}

impl OpenAiProvider {
    /// Create a provider for the given model.
    ///
    /// The API key is read by the underlying client from the environment;
    /// the registry in [`super::create_provider`] has already verified it
    /// is present.
    pub fn new(model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: async_openai::Client::with_config(OpenAIConfig::default())
                .with_http_client(http),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages), fields(count = messages.len()))]
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut request_messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(messages.len());

        for message in messages {
            let built = match message.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map(Into::into),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map(Into::into),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map(Into::into),
            };
            request_messages.push(built.map_err(|e| FragaError::Provider(e.to_string()))?);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .temperature(0.7)
            .build()
            .map_err(|e| FragaError::Provider(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| FragaError::Provider(format!("OpenAI request failed: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| FragaError::Provider("Empty response from OpenAI".to_string()))?
            .clone();

        debug!("Received {} characters from OpenAI", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_reports_name_and_model() {
        let provider = OpenAiProvider::new("gpt-4o-mini").unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4o-mini");
    }
}
