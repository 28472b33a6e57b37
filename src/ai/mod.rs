//! AI Integration Layer
//!
//! Generation-provider abstraction, rate limiting, prompt construction,
//! and untrusted-response parsing for the digest pipeline.

pub mod prompt;
pub mod provider;
pub mod rate_limit;
pub mod response;

pub use prompt::{DigestPrompts, ExtractionKind, PromptBuilder};
pub use provider::{
    ErrorCategory, ErrorClassifier, GenerationProvider, LlmError, OllamaProvider, OpenAiProvider,
    ProviderConfig, SharedProvider, create_provider,
};
pub use rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter, UsageStats};
pub use response::{ModelJson, parse_label, parse_model_json, parse_string_array};
