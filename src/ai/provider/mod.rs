//! Generation Provider Abstraction
//!
//! Defines the GenerationProvider trait for the hosted text-generation
//! service. Providers return raw text: every response is untrusted and
//! goes through parse-or-fallback at the pipeline stage that issued it.

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::network;
use crate::types::{DigestError, Result};

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for generation providers
///
/// Note: API keys are handled securely - they are never serialized to output
/// and are redacted in debug output. Each provider converts the key to
/// SecretString internally for runtime protection.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "openai", "ollama"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for generation (0.0 = deterministic)
    pub temperature: f32,
    /// API key; never serialized to output for security
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_max_tokens() -> usize {
    1024
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.2,
            api_key: None,
            api_base: None,
            max_tokens: 1024,
        }
    }
}

impl ProviderConfig {
    /// Validate fields that can be checked without credentials
    pub fn validate(&self) -> Result<()> {
        if let Some(base) = &self.api_base {
            url::Url::parse(base).map_err(|e| {
                DigestError::Config(format!("Invalid api_base '{base}': {e}"))
            })?;
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(DigestError::Config(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Generation Provider Trait
// =============================================================================

/// Shared provider type injected into the pipeline
pub type SharedProvider = Arc<dyn GenerationProvider + Send + Sync>;

/// Text-generation provider.
///
/// `generate` returns the raw response text. Providers retry transient
/// transport failures internally with exponential backoff; everything
/// else surfaces as an error for the caller's stage fallback.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a text completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is available
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration.
///
/// Missing credentials are a fatal configuration error raised here,
/// before any pipeline work starts.
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    config.validate()?;
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(DigestError::Config(format!(
            "Unknown provider: {}. Supported: openai, ollama",
            config.provider
        ))),
    }
}

// =============================================================================
// Test Doubles
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that always fails, for exercising fallback paths
    pub struct FailingProvider {
        pub calls: AtomicUsize,
    }

    impl FailingProvider {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        pub fn shared() -> SharedProvider {
            Arc::new(Self::new())
        }
    }

    #[async_trait]
    impl GenerationProvider for FailingProvider {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DigestError::LlmApi("stubbed failure".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn model(&self) -> &str {
            "none"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }
    }

    /// Provider returning scripted responses in order, then failing
    pub struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedProvider {
        pub fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn shared(responses: Vec<&str>) -> SharedProvider {
            Arc::new(Self::new(responses))
        }
    }

    #[async_trait]
    impl GenerationProvider for ScriptedProvider {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Err(DigestError::LlmApi("script exhausted".to_string()))
            } else {
                Ok(responses.remove(0))
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_config_error() {
        let config = ProviderConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_provider(&config),
            Err(DigestError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_api_base_rejected() {
        let config = ProviderConfig {
            api_base: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
