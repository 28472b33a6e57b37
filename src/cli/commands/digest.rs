//! Digest Command
//!
//! Runs the full pipeline over an activity file: load config, construct
//! the provider and rate limiter, run, and render the report.
//!
//! Usage:
//!   devdigest run activity.json [--from DATE --to DATE] [--mode optimized]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use tracing::info;

use crate::ai::{RateLimiter, create_provider};
use crate::cli::output::{ConsoleObserver, Output};
use crate::config::ConfigLoader;
use crate::observe::TracingObserver;
use crate::pipeline::{DigestInput, DigestPipeline, PipelineMode};
use crate::types::{DateRange, DigestError, Result};

/// Options assembled from CLI arguments; unset fields defer to config
#[derive(Debug, Default)]
pub struct DigestOptions {
    pub input: PathBuf,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub mode: Option<PipelineMode>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub format: String,
}

pub async fn run(options: DigestOptions) -> Result<()> {
    let output = Output::new();

    let mut config = ConfigLoader::load()?;
    if let Some(provider) = options.provider {
        config.provider.provider = provider;
    }
    if let Some(model) = options.model {
        config.provider.model = Some(model);
    }
    config.validate()?;

    let mode = options.mode.unwrap_or(config.digest.mode);
    let range = resolve_range(options.from, options.to)?;
    let input = load_input(&options.input)?;

    info!(
        provider = %config.provider.provider,
        %mode,
        range = %range,
        "starting digest run"
    );

    let provider = create_provider(&config.provider)?;
    let limiter = RateLimiter::shared(config.rate_limit.to_rate_limit_config());
    let as_json = options.format == "json";
    let observer: crate::observe::SharedObserver = if as_json {
        // Keep stdout clean for the JSON document
        TracingObserver::shared()
    } else {
        Arc::new(ConsoleObserver)
    };

    let pipeline = DigestPipeline::new(provider, limiter, observer, mode);
    let report = pipeline.run(&input, range).await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output.header(&format!("Weekly Digest: {}", range.label()));

    output.section("Achievements");
    for achievement in &report.achievements {
        println!("  [{}] {}", achievement.category, achievement.description);
    }

    if let Some(highlights) = &report.summary.highlights {
        output.section("Highlights");
        for highlight in highlights {
            println!("  • {highlight}");
        }
    }

    output.section("Email Draft");
    println!("{}", report.email);

    output.info(&format!(
        "confidence {}/100, {} model calls ({} mode)",
        report.confidence, report.model_calls, report.mode
    ));
    output.success("Digest complete");

    Ok(())
}

/// Default range is the trailing week ending today
fn resolve_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<DateRange> {
    let end = to.unwrap_or_else(|| Local::now().date_naive());
    let start = from.unwrap_or(end - Duration::days(6));
    if start > end {
        return Err(DigestError::Config(format!(
            "--from ({start}) is after --to ({end})"
        )));
    }
    Ok(DateRange::new(start, end))
}

fn load_input(path: &Path) -> Result<DigestInput> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_resolve_range_defaults_to_trailing_week() {
        let range = resolve_range(None, None).unwrap();
        assert_eq!(range.end - range.start, Duration::days(6));
    }

    #[test]
    fn test_resolve_range_rejects_inverted() {
        let from = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 8, 17).unwrap();
        assert!(resolve_range(Some(from), Some(to)).is_err());
    }

    #[test]
    fn test_load_input_with_partial_fields() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "commits": [{{"message": "fix: parser crash"}}],
                "pull_requests": [{{"number": 7, "title": "Add exports"}}]
            }}"#
        )
        .unwrap();

        let input = load_input(file.path()).unwrap();
        assert_eq!(input.commits.len(), 1);
        assert_eq!(input.pull_requests.len(), 1);
        assert!(input.notes.is_empty());
    }
}
