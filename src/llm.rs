//! Chat generation providers.
//!
//! Concrete backends for the core [`GenerationProvider`] trait:
//! - **[`DisabledGenerator`]** returns errors; used when no LLM is configured.
//! - **[`OpenAIChat`]** calls `POST {url}/chat/completions`.
//! - **[`OllamaChat`]** calls `POST {url}/api/chat` with streaming off.
//!
//! Both HTTP providers share the retry policy in [`crate::http`].

use std::sync::Arc;

use anyhow::{bail, Result};
use arag_bench_core::llm::{GenerationProvider, Message};
use arag_bench_core::RagError;
use async_trait::async_trait;
use tracing::debug;

use crate::config::LlmConfig;
use crate::http::{build_client, post_json_with_retry};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

pub struct DisabledGenerator;

#[async_trait]
impl GenerationProvider for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _messages: &[Message]) -> arag_bench_core::Result<String> {
        Err(RagError::Provider(
            "llm provider is disabled; set [llm].provider".to_string(),
        ))
    }
}

pub struct OpenAIChat {
    model: String,
    base_url: String,
    api_key: String,
    temperature: f32,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIChat {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("llm.model required for OpenAI provider"))?;
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set for llm provider"))?;

        Ok(Self {
            model,
            base_url: config
                .url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            api_key,
            temperature: config.temperature,
            max_retries: config.max_retries,
            client: build_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl GenerationProvider for OpenAIChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, messages: &[Message]) -> arag_bench_core::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
        });
        let json = post_json_with_retry(
            &self.client,
            &format!("{}/chat/completions", self.base_url),
            Some(&self.api_key),
            &body,
            self.max_retries,
            "OpenAI",
        )
        .await?;
        let content = parse_openai_chat(&json)?;
        debug!(model = %self.model, chars = content.len(), "chat completion received");
        Ok(content)
    }
}

/// Extract `choices[0].message.content`.
pub fn parse_openai_chat(json: &serde_json::Value) -> arag_bench_core::Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| RagError::Provider("Invalid OpenAI response: missing message content".into()))
}

pub struct OllamaChat {
    model: String,
    url: String,
    temperature: f32,
    max_retries: u32,
    client: reqwest::Client,
}

impl OllamaChat {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("llm.model required for Ollama provider"))?;

        Ok(Self {
            model,
            url: config
                .url
                .clone()
                .unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            temperature: config.temperature,
            max_retries: config.max_retries,
            client: build_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl GenerationProvider for OllamaChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, messages: &[Message]) -> arag_bench_core::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "options": { "temperature": self.temperature },
        });
        let json = post_json_with_retry(
            &self.client,
            &format!("{}/api/chat", self.url),
            None,
            &body,
            self.max_retries,
            "Ollama",
        )
        .await?;
        parse_ollama_chat(&json)
    }
}

/// Extract `message.content`.
pub fn parse_ollama_chat(json: &serde_json::Value) -> arag_bench_core::Result<String> {
    json.get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| RagError::Provider("Invalid Ollama response: missing message content".into()))
}

pub fn create_generator(config: &LlmConfig) -> Result<Arc<dyn GenerationProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledGenerator)),
        "openai" => Ok(Arc::new(OpenAIChat::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaChat::new(config)?)),
        other => bail!("Unknown llm provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_openai_chat() {
        let json = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "42"}}]
        });
        assert_eq!(parse_openai_chat(&json).unwrap(), "42");
        assert!(parse_openai_chat(&serde_json::json!({"choices": []})).is_err());
    }

    #[test]
    fn test_parse_ollama_chat() {
        let json = serde_json::json!({"message": {"role": "assistant", "content": "hi"}});
        assert_eq!(parse_ollama_chat(&json).unwrap(), "hi");
        assert!(parse_ollama_chat(&serde_json::json!({"done": true})).is_err());
    }

    #[tokio::test]
    async fn test_disabled_generator() {
        let generator = create_generator(&LlmConfig::default()).unwrap();
        assert_eq!(generator.model_name(), "disabled");
        let err = generator.generate(&[Message::user("q")]).await.unwrap_err();
        assert!(matches!(err, RagError::Provider(_)));
    }

    #[test]
    fn test_ollama_requires_model() {
        let config = LlmConfig {
            provider: "ollama".to_string(),
            ..LlmConfig::default()
        };
        assert!(OllamaChat::new(&config).is_err());
    }
}
