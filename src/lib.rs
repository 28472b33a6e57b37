//! devdigest - AI-Driven Weekly Digest Generator
//!
//! Turns a week of raw developer activity (commits, pull requests, notes)
//! into a categorized summary and a business-readable email draft.
//!
//! ## Core Features
//!
//! - **Resilient Pipeline**: every generation call pairs with a
//!   deterministic fallback, so a degraded backend lowers quality
//!   instead of failing the run
//! - **Closed Taxonomy**: activities classify into a fixed eight-member
//!   category set, mapped onto three summary buckets
//! - **Rate Limiting**: sliding-window governor over all generation calls
//! - **Two Modes**: per-stage calls (detailed) or one comprehensive call
//!   (optimized)
//!
//! ## Quick Start
//!
//! ```ignore
//! use devdigest::ai::{RateLimiter, create_provider};
//! use devdigest::config::ConfigLoader;
//! use devdigest::observe::TracingObserver;
//! use devdigest::pipeline::{DigestInput, DigestPipeline};
//!
//! let config = ConfigLoader::load()?;
//! let provider = create_provider(&config.provider)?;
//! let limiter = RateLimiter::shared(config.rate_limit.to_rate_limit_config());
//! let pipeline = DigestPipeline::new(
//!     provider,
//!     limiter,
//!     TracingObserver::shared(),
//!     config.digest.mode,
//! );
//! let report = pipeline.run(&input, range).await;
//! println!("{}", report.email);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider abstraction, rate limiting, prompts, response parsing
//! - [`pipeline`]: classification, aggregation, extraction, composition
//! - [`config`]: hierarchical configuration loading
//! - [`observe`]: structured stage-event observability

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod observe;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{DigestError, ErrorCategory, LlmError, Result};

// Domain Types
pub use types::{
    Achievement, ActivityRecord, CategorizedActivity, Category, DateRange, ImpactLevel,
    SourceKind, WeeklySummary,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{DigestInput, DigestPipeline, DigestReport, PipelineMode};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    GenerationProvider, ProviderConfig, RateLimitConfig, RateLimiter, SharedProvider,
    SharedRateLimiter, create_provider,
};
