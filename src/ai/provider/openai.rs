//! OpenAI API Provider
//!
//! Text generation via OpenAI's Chat Completions API.
//! Transient transport failures are retried with exponential backoff
//! before the error surfaces to the pipeline stage.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{GenerationProvider, ProviderConfig};
use crate::constants::network;
use crate::types::{DigestError, ErrorClassifier, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI API provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                DigestError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DigestError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You summarize software development activity for business readers. \
                              Follow the output contract in each request exactly."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }

    async fn send_request(&self, request: &ChatCompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                DigestError::Llm(ErrorClassifier::classify(
                    &format!("OpenAI request failed: {}", e),
                    "openai",
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DigestError::Llm(ErrorClassifier::classify_http_status(
                status,
                &format!("OpenAI API error: {}", body),
                "openai",
            )));
        }

        let response_body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| DigestError::LlmApi(format!("Failed to parse OpenAI response: {}", e)))?;

        response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| DigestError::LlmApi("Empty content in OpenAI response".to_string()))
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            model = %self.model,
            temperature = self.temperature,
            "generating with OpenAI"
        );

        let request = self.build_request(prompt);

        (|| self.send_request(&request))
            .retry(
                ExponentialBuilder::default()
                    .with_max_times(network::MAX_PROVIDER_RETRIES)
                    .with_jitter(),
            )
            .when(|err: &DigestError| matches!(err, DigestError::Llm(e) if e.is_retryable()))
            .notify(|err, dur| {
                warn!("transient OpenAI failure, retrying in {:?}: {}", dur, err);
            })
            .await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("OpenAI API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("OpenAI API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("OpenAI API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_prompt_and_model() {
        let provider = OpenAiProvider::new(ProviderConfig {
            api_key: Some("sk-test".to_string()),
            model: Some("gpt-test".to_string()),
            ..Default::default()
        })
        .unwrap();

        let request = provider.build_request("classify this");
        assert_eq!(request.model, "gpt-test");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].content, "classify this");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        // Explicit empty config; env fallback only applies when unset
        if std::env::var("OPENAI_API_KEY").is_ok() {
            return;
        }
        let result = OpenAiProvider::new(ProviderConfig::default());
        assert!(matches!(result, Err(DigestError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = OpenAiProvider::new(ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(!format!("{provider:?}").contains("sk-secret"));
    }
}
