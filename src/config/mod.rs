//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/devdigest/config.toml)
//! 3. Project config (.devdigest/config.toml)
//! 4. Environment variables (DEVDIGEST_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
