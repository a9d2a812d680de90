//! Mock provider implementation for testing.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

type Reply = Result<String, ProviderError>;

/// Text provider that answers from a fixed script.
///
/// Each rule pairs a needle with a reply; the first rule whose needle occurs
/// in the prompt wins. Prompts without a matching rule get the fallback.
pub struct ScriptedTextProvider {
    rules: Vec<(String, Reply)>,
    fallback: Reply,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedTextProvider {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Err(ProviderError::NotConfigured(
                "No scripted reply for prompt".to_string(),
            )),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `text` when the prompt contains `needle`.
    pub fn reply_when(mut self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Ok(text.into())));
        self
    }

    /// Fail with `error` when the prompt contains `needle`.
    pub fn fail_when(mut self, needle: impl Into<String>, error: ProviderError) -> Self {
        self.rules.push((needle.into(), Err(error)));
        self
    }

    /// Reply used when no rule matches.
    pub fn otherwise(mut self, text: impl Into<String>) -> Self {
        self.fallback = Ok(text.into());
        self
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl Default for ScriptedTextProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextProvider for ScriptedTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.fallback)
            .clone()?;

        Ok(ProviderResponse {
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: reply.len() as i32 / 4,
            text: reply,
            finish_reason: FinishReason::Complete,
        })
    }
}
