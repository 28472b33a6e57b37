//! Highlight Extraction and Confidence Scoring
//!
//! Highlights: one model call ranking the top 1-3 highest-impact
//! activities, falling back to a scan over the highlight vocabulary.
//!
//! Confidence: a diagnostic weighted sum over activity count, source
//! diversity, high-impact count, and per-source weights. Purely
//! informational metadata; nothing branches on it.

use std::collections::HashSet;

use tracing::debug;

use super::keywords::is_highlight_worthy;
use crate::ai::{DigestPrompts, SharedProvider, SharedRateLimiter, parse_string_array};
use crate::constants::highlights::MAX_HIGHLIGHTS;
use crate::types::{CategorizedActivity, ImpactLevel, Result, SourceKind};

// =============================================================================
// Highlight Extraction
// =============================================================================

pub struct HighlightExtractor {
    provider: SharedProvider,
    limiter: SharedRateLimiter,
}

impl HighlightExtractor {
    pub fn new(provider: SharedProvider, limiter: SharedRateLimiter) -> Self {
        Self { provider, limiter }
    }

    /// Pick the 1-3 standout activities, most impactful first
    pub async fn extract(&self, activities: &[CategorizedActivity]) -> Vec<String> {
        if activities.is_empty() {
            return Vec::new();
        }

        match self.model_extract(activities).await {
            Ok(highlights) if !highlights.is_empty() => highlights,
            Ok(_) => keyword_highlights(activities),
            Err(err) => {
                debug!("highlight ranking failed, using keyword scan: {err}");
                keyword_highlights(activities)
            }
        }
    }

    async fn model_extract(&self, activities: &[CategorizedActivity]) -> Result<Vec<String>> {
        let descriptions: Vec<String> = activities
            .iter()
            .map(|a| a.business_description.clone())
            .collect();

        let prompt = DigestPrompts::highlights(&descriptions);
        let raw = self
            .limiter
            .execute("highlights", || self.provider.generate(&prompt))
            .await?;

        let items = parse_string_array(&raw).ok_or_else(|| {
            crate::types::DigestError::LlmApi("highlight response was not a string array".into())
        })?;

        // Only accept entries the model copied from the input
        Ok(items
            .into_iter()
            .filter(|item| descriptions.iter().any(|d| d == item))
            .take(MAX_HIGHLIGHTS)
            .collect())
    }
}

/// Fallback: scan the highlight vocabulary, preferring high-impact items
pub fn keyword_highlights(activities: &[CategorizedActivity]) -> Vec<String> {
    let mut picks: Vec<&CategorizedActivity> = activities
        .iter()
        .filter(|a| a.impact == ImpactLevel::High || is_highlight_worthy(&a.text))
        .collect();
    picks.sort_by(|a, b| b.impact.cmp(&a.impact));

    picks
        .into_iter()
        .map(|a| a.business_description.clone())
        .take(MAX_HIGHLIGHTS)
        .collect()
}

// =============================================================================
// Confidence Scoring
// =============================================================================

/// Per-source confidence weight: merged pull requests are the strongest
/// signal of real shipped work, manual notes the weakest.
fn source_weight(source: SourceKind) -> f32 {
    match source {
        SourceKind::PullRequest => 3.0,
        SourceKind::Commit => 2.0,
        SourceKind::Note => 1.0,
        SourceKind::Manual => 0.5,
    }
}

/// Diagnostic confidence in the digest, clamped to [0, 100]
pub fn confidence_score(activities: &[CategorizedActivity]) -> u8 {
    if activities.is_empty() {
        return 0;
    }

    // Activity count, capped contribution
    let count_score = (activities.len() as f32 * 4.0).min(40.0);

    // Source-kind diversity
    let kinds: HashSet<SourceKind> = activities.iter().map(|a| a.source).collect();
    let diversity_score = kinds.len() as f32 * 10.0;

    // High-impact activities, capped contribution
    let high_count = activities
        .iter()
        .filter(|a| a.impact == ImpactLevel::High)
        .count();
    let impact_score = (high_count as f32 * 5.0).min(15.0);

    // Average per-source weight, scaled
    let avg_weight = activities.iter().map(|a| source_weight(a.source)).sum::<f32>()
        / activities.len() as f32;
    let weight_score = avg_weight * 5.0;

    (count_score + diversity_score + impact_score + weight_score).clamp(0.0, 100.0) as u8
}
