//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/devdigest/) and project (.devdigest/)
//! level configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::{ProviderConfig, RateLimitConfig};
use crate::constants::rate_limit as limits;
use crate::pipeline::PipelineMode;
use crate::types::Result;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Generation provider settings
    pub provider: ProviderConfig,

    /// Rate limiter settings
    pub rate_limit: RateLimitSettings,

    /// Digest pipeline settings
    pub digest: DigestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            provider: ProviderConfig::default(),
            rate_limit: RateLimitSettings::default(),
            digest: DigestConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DigestError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        self.provider.validate()?;
        self.rate_limit.to_rate_limit_config().validate()?;
        Ok(())
    }
}

// =============================================================================
// Rate Limiter Settings
// =============================================================================

/// TOML/env-friendly rate limiter settings; converted to
/// [`RateLimitConfig`] when the limiter is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Maximum calls allowed inside one trailing window
    pub max_calls: u32,

    /// Trailing window duration in seconds
    pub window_secs: u64,

    /// Margin in milliseconds added to computed waits
    pub safety_margin_ms: u64,

    /// Optional cap in seconds on how long a call may wait for a slot.
    /// Unset waits indefinitely.
    pub max_wait_secs: Option<u64>,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_calls: limits::DEFAULT_MAX_CALLS,
            window_secs: limits::DEFAULT_WINDOW_SECS,
            safety_margin_ms: limits::DEFAULT_SAFETY_MARGIN_MS,
            max_wait_secs: None,
        }
    }
}

impl RateLimitSettings {
    pub fn to_rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_calls: self.max_calls,
            window: Duration::from_secs(self.window_secs),
            safety_margin: Duration::from_millis(self.safety_margin_ms),
            max_wait: self.max_wait_secs.map(Duration::from_secs),
        }
    }
}

// =============================================================================
// Digest Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DigestConfig {
    /// Pipeline execution mode
    pub mode: PipelineMode,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.provider.provider, "openai");
        assert_eq!(config.digest.mode, PipelineMode::Detailed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rate_limit_conversion() {
        let settings = RateLimitSettings {
            max_calls: 5,
            window_secs: 30,
            safety_margin_ms: 250,
            max_wait_secs: Some(120),
        };
        let config = settings.to_rate_limit_config();
        assert_eq!(config.max_calls, 5);
        assert_eq!(config.window, Duration::from_secs(30));
        assert_eq!(config.safety_margin, Duration::from_millis(250));
        assert_eq!(config.max_wait, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_validation_rejects_zero_calls() {
        let config = Config {
            rate_limit: RateLimitSettings {
                max_calls: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_temperature() {
        let mut config = Config::default();
        config.provider.temperature = 3.5;
        assert!(config.validate().is_err());
    }
}
