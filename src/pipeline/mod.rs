//! Digest Pipeline
//!
//! The resilient transformation chain from raw developer activity to a
//! business-readable weekly email. Each stage pairs one rate-limited
//! generation call with a deterministic fallback, so degraded backends
//! lower output quality instead of failing the run.

pub mod aggregator;
pub mod classifier;
pub mod email;
pub mod extractor;
pub mod highlights;
pub mod keywords;
pub mod orchestrator;

pub use aggregator::Aggregator;
pub use classifier::Classifier;
pub use email::EmailComposer;
pub use extractor::ContentExtractor;
pub use highlights::{HighlightExtractor, confidence_score};
pub use orchestrator::{DigestInput, DigestPipeline, DigestReport, PipelineMode};
