//! Config Command
//!
//! Manage devdigest configuration.
//!
//! Usage:
//!   devdigest config show [-f json]
//!   devdigest config path
//!   devdigest config init

use crate::config::ConfigLoader;
use crate::types::{DigestError, Result};

/// Show merged effective configuration
pub fn show(format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!(
            "{}",
            toml::to_string_pretty(&config).map_err(|e| DigestError::Config(e.to_string()))?
        );
    }
    Ok(())
}

/// Show configuration file paths
pub fn path() -> Result<()> {
    println!("Configuration paths:");
    println!();

    if let Some(global) = ConfigLoader::global_config_path() {
        let exists = if global.exists() { "✓" } else { "✗" };
        println!("  Global:  {} {}", exists, global.display());
    } else {
        println!("  Global:  (not available)");
    }

    let project = ConfigLoader::project_config_path();
    let exists = if project.exists() { "✓" } else { "✗" };
    println!("  Project: {} {}", exists, project.display());

    Ok(())
}

/// Initialize project configuration
pub fn init_project() -> Result<()> {
    let dir = ConfigLoader::init_project()?;
    println!("✓ Initialized project configuration");
    println!("  Directory: {}", dir.display());
    println!(
        "  Config:    {}",
        ConfigLoader::project_config_path().display()
    );
    Ok(())
}
