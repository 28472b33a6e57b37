//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/devdigest/config.toml)
//! 3. Project config (.devdigest/config.toml)
//! 4. Environment variables (DEVDIGEST_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{DigestError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Merge global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        // Merge project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // Merge environment variables (e.g., DEVDIGEST_PROVIDER_MODEL -> provider.model)
        figment = figment.merge(Env::prefixed("DEVDIGEST_").split('_').lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| DigestError::Config(format!("Configuration error: {}", e)))?;

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| DigestError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/devdigest/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("devdigest"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".devdigest/config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".devdigest")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize project configuration
    pub fn init_project() -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        fs::create_dir_all(&project_dir)?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created project config: {}", config_path.display());
        }

        Ok(project_dir)
    }

    /// Generate default project config content (TOML)
    fn default_project_config() -> String {
        r#"# devdigest Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

# Generation provider
[provider]
provider = "openai"
timeout_secs = 120
temperature = 0.2

# Generation API rate limiting
[rate_limit]
max_calls = 10
window_secs = 60

# Digest pipeline
[digest]
mode = "detailed"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_default_config() {
        // Jail points the global dir and cwd at an empty temp dir, so
        // nothing from the host machine leaks into the chain.
        figment::Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().join("config").display());
            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.version, "1.0");
            assert_eq!(config.provider.provider, "openai");
            Ok(())
        });
    }

    #[test]
    fn test_project_config_overrides_global() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().join("config").display());
            jail.create_dir("config/devdigest")?;
            jail.create_file(
                "config/devdigest/config.toml",
                r#"
                [provider]
                provider = "ollama"

                [rate_limit]
                max_calls = 4
                "#,
            )?;
            jail.create_dir(".devdigest")?;
            jail.create_file(
                ".devdigest/config.toml",
                r#"
                [rate_limit]
                max_calls = 7
                "#,
            )?;

            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.provider.provider, "ollama");
            assert_eq!(config.rate_limit.max_calls, 7);
            Ok(())
        });
    }

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [provider]
            provider = "ollama"
            model = "llama3"

            [rate_limit]
            max_calls = 4

            [digest]
            mode = "optimized"
            "#
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.provider.provider, "ollama");
        assert_eq!(config.provider.model.as_deref(), Some("llama3"));
        assert_eq!(config.rate_limit.max_calls, 4);
        // Unset fields keep their defaults
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.digest.mode, PipelineMode::Optimized);
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [rate_limit]
            max_calls = 0
            "#
        )
        .unwrap();
        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().join("config").display());
            jail.set_env("DEVDIGEST_PROVIDER_MODEL", "test-model");
            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.provider.model.as_deref(), Some("test-model"));
            Ok(())
        });
    }
}
