//! LLM provider abstraction.
//!
//! Providers are selected by name at construction time. Each provider
//! carries its own credential environment variable and default model, so
//! adding a backend means one registry entry and one `invoke`
//! implementation.

mod anthropic;
mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

use crate::error::{FragaError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat exchange.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Trait for LLM provider implementations.
///
/// `invoke` is a blocking async call; network and API failures surface as
/// [`FragaError::Provider`], the transient failure class.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g. "openai", "anthropic").
    fn name(&self) -> &str;

    /// Model identifier this provider was constructed with.
    fn model(&self) -> &str;

    /// Send a message sequence and return the generated answer text.
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String>;
}

impl std::fmt::Debug for dyn LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmProvider")
            .field("name", &self.name())
            .field("model", &self.model())
            .finish()
    }
}

/// Static configuration for a known provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderConfig {
    pub name: &'static str,
    pub credential_var: &'static str,
    pub default_model: &'static str,
}

/// The known provider set.
pub const PROVIDERS: &[ProviderConfig] = &[
    ProviderConfig {
        name: "openai",
        credential_var: "OPENAI_API_KEY",
        default_model: "gpt-4o-mini",
    },
    ProviderConfig {
        name: "anthropic",
        credential_var: "ANTHROPIC_API_KEY",
        default_model: "claude-3-5-sonnet-latest",
    },
];

/// Look up the configuration for a provider name.
pub fn provider_config(name: &str) -> Option<&'static ProviderConfig> {
    PROVIDERS.iter().find(|p| p.name == name)
}

/// Check whether a provider's credential is present, without constructing it.
pub fn probe(name: &str) -> bool {
    provider_config(name)
        .map(|config| std::env::var(config.credential_var).is_ok_and(|k| !k.is_empty()))
        .unwrap_or(false)
}

/// Construct a provider by name, with an optional model override.
///
/// Fails with a configuration error when the name is unknown or the
/// provider's credential is missing; no partially constructed provider is
/// ever returned.
pub fn create_provider(name: &str, model: Option<&str>) -> Result<Arc<dyn LlmProvider>> {
    let config = provider_config(name).ok_or_else(|| {
        let known: Vec<&str> = PROVIDERS.iter().map(|p| p.name).collect();
        FragaError::Config(format!(
            "Unknown LLM provider '{}'. Known providers: {}",
            name,
            known.join(", ")
        ))
    })?;

    let credential = std::env::var(config.credential_var)
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            FragaError::Config(format!(
                "{} not set. Set it with: export {}='...'",
                config.credential_var, config.credential_var
            ))
        })?;

    let model = model.unwrap_or(config.default_model);

    match config.name {
        "openai" => Ok(Arc::new(OpenAiProvider::new(model)?)),
        "anthropic" => Ok(Arc::new(AnthropicProvider::new(&credential, model)?)),
        _ => unreachable!("provider registry out of sync"),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted provider for engine tests.

    use super::{ChatMessage, LlmProvider};
    use crate::error::{FragaError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns canned answers and records every message sequence it is
    /// invoked with.
    pub struct MockProvider {
        pub calls: Mutex<Vec<Vec<ChatMessage>>>,
        pub fail_with: Option<String>,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self { calls: Mutex::new(Vec::new()), fail_with: None }
        }

        pub fn failing(reason: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: Some(reason.to_string()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(messages.to_vec());
            match &self.fail_with {
                Some(reason) => Err(FragaError::Provider(reason.clone())),
                None => Ok(format!("answer {}", calls.len())),
            }
        }
    }
}
