use anyhow::Error;
use futures::stream::BoxStream;

use super::core::{Message, completion_stream};
use crate::core::AppConfig;

/// A stream of text deltas from a completion provider, in the order
/// they were generated.
pub type DeltaStream = BoxStream<'static, Result<String, Error>>;

/// Anything that can turn a conversation into a stream of generated
/// text.
pub trait CompletionProvider: Send + Sync {
    fn stream(&self, messages: &[Message]) -> DeltaStream;
}

/// Completion provider backed by an OpenAI compatible chat completion
/// API (Groq, OpenAI, llama.cpp server, etc.)
#[derive(Clone, Debug)]
pub struct OpenAiProvider {
    api_hostname: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_hostname: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.llm_api_hostname,
            &config.llm_api_key,
            &config.llm_model,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionProvider for OpenAiProvider {
    fn stream(&self, messages: &[Message]) -> DeltaStream {
        tracing::debug!(
            "Requesting completion from {} with {} messages",
            self.model,
            messages.len()
        );
        completion_stream(messages, &self.api_hostname, &self.api_key, &self.model)
    }
}
