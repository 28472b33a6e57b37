//! Supplementary Content Extractor
//!
//! Pulls achievement, insight, and learning statements out of
//! unstructured notes. Each extraction issues one model call expecting a
//! JSON string array; malformed output or a model error falls back to
//! sentence-splitting plus a kind-specific keyword filter with a small
//! fixed cap, so extraction returns an empty sequence rather than an
//! error when nothing matches.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::keywords::{
    ACHIEVEMENT_KEYWORDS, INSIGHT_KEYWORDS, LEARNING_KEYWORDS, split_sentences,
};
use crate::ai::{
    DigestPrompts, ExtractionKind, SharedProvider, SharedRateLimiter, parse_string_array,
};
use crate::constants::extraction as caps;
use crate::types::{ContentBlob, ContentType, Result};

pub struct ContentExtractor {
    provider: SharedProvider,
    limiter: SharedRateLimiter,
}

impl ContentExtractor {
    pub fn new(provider: SharedProvider, limiter: SharedRateLimiter) -> Self {
        Self { provider, limiter }
    }

    /// Extract concrete completed-work statements (cap 5 on fallback)
    pub async fn extract_achievements(&self, blob: &ContentBlob) -> Vec<String> {
        self.extract(blob, ExtractionKind::Achievements).await
    }

    /// Extract discovery/realization statements (cap 3 on fallback)
    pub async fn extract_insights(&self, blob: &ContentBlob) -> Vec<String> {
        self.extract(blob, ExtractionKind::Insights).await
    }

    /// Extract new-knowledge statements (cap 3 on fallback)
    pub async fn extract_learnings(&self, blob: &ContentBlob) -> Vec<String> {
        self.extract(blob, ExtractionKind::Learnings).await
    }

    async fn extract(&self, blob: &ContentBlob, kind: ExtractionKind) -> Vec<String> {
        let cleaned = clean_content(&blob.content, blob.content_type);
        if cleaned.trim().is_empty() {
            return Vec::new();
        }

        match self.model_extract(&cleaned, kind).await {
            Ok(items) => deduplicate_and_rank(items),
            Err(err) => {
                debug!(?kind, "extraction call failed, using keyword fallback: {err}");
                keyword_extract(&cleaned, kind)
            }
        }
    }

    async fn model_extract(&self, text: &str, kind: ExtractionKind) -> Result<Vec<String>> {
        let prompt = DigestPrompts::extract(kind, text);
        let raw = self
            .limiter
            .execute("extract", || self.provider.generate(&prompt))
            .await?;
        parse_string_array(&raw).ok_or_else(|| {
            crate::types::DigestError::LlmApi(format!(
                "extraction response was not a JSON string array: {}",
                raw.chars().take(120).collect::<String>()
            ))
        })
    }
}

// =============================================================================
// Keyword Fallback
// =============================================================================

/// Sentence-split the input and keep sentences matching the kind's
/// keyword set, capped to bound output size.
pub fn keyword_extract(text: &str, kind: ExtractionKind) -> Vec<String> {
    let (keywords, cap) = match kind {
        ExtractionKind::Achievements => (ACHIEVEMENT_KEYWORDS, caps::MAX_ACHIEVEMENTS),
        ExtractionKind::Insights => (INSIGHT_KEYWORDS, caps::MAX_INSIGHTS),
        ExtractionKind::Learnings => (LEARNING_KEYWORDS, caps::MAX_LEARNINGS),
    };

    split_sentences(text)
        .into_iter()
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            keywords.iter().any(|kw| lower.contains(kw))
        })
        .take(cap)
        .collect()
}

// =============================================================================
// Deduplication and Ranking
// =============================================================================

/// Remove exact duplicates and short fragments, rank by descending
/// length (a proxy for informativeness), and truncate.
pub fn deduplicate_and_rank(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut kept: Vec<String> = items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| item.len() >= caps::MIN_ITEM_LEN && seen.insert(item.clone()))
        .collect();

    kept.sort_by(|a, b| b.len().cmp(&a.len()));
    kept.truncate(caps::MAX_RANKED_ITEMS);
    kept
}

// =============================================================================
// Content Cleaning
// =============================================================================

// Leading whitespace must not include newlines, or a marker after a
// blank line would swallow the blank line too.
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]*(?:[-*+]|\d+[.)])\s+").expect("valid pattern"));
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+").expect("valid pattern"));
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{1,2}|__").expect("valid pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid pattern"));
static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*_]{3,}\s*$").expect("valid pattern"));
static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[ xX]\]\s*").expect("valid pattern"));
static BLOCKQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>\s*").expect("valid pattern"));

/// Strip structural markup per declared content type before extraction
pub fn clean_content(content: &str, content_type: ContentType) -> String {
    match content_type {
        ContentType::PlainText => content.trim().to_string(),
        ContentType::LightweightMarkup => strip_markup(content),
        ContentType::StructuredNotes => {
            let stripped = strip_markup(content);
            let stripped = CHECKBOX.replace_all(&stripped, "");
            BLOCKQUOTE.replace_all(&stripped, "").trim().to_string()
        }
    }
}

fn strip_markup(content: &str) -> String {
    let s = LINK.replace_all(content, "$1");
    let s = HORIZONTAL_RULE.replace_all(&s, "");
    let s = HEADER.replace_all(&s, "");
    let s = LIST_MARKER.replace_all(&s, "");
    let s = EMPHASIS.replace_all(&s, "");
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::testing::{FailingProvider, ScriptedProvider};
    use crate::ai::{RateLimitConfig, RateLimiter};

    fn limiter() -> SharedRateLimiter {
        RateLimiter::shared(RateLimitConfig::default())
    }

    fn plain(content: &str) -> ContentBlob {
        ContentBlob {
            content: content.to_string(),
            content_type: ContentType::PlainText,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_model_extraction_parses_array() {
        let extractor = ContentExtractor::new(
            ScriptedProvider::shared(vec![r#"["Shipped the CSV exporter to production"]"#]),
            limiter(),
        );
        let items = extractor
            .extract_achievements(&plain("this week I shipped exports"))
            .await;
        assert_eq!(items, vec!["Shipped the CSV exporter to production"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_filters_by_keyword_set() {
        let extractor = ContentExtractor::new(FailingProvider::shared(), limiter());
        let blob = plain(
            "Shipped the exporter on Tuesday. The weather was nice. \
             Learned a lot about tokio internals. Realized the cache was stale.",
        );

        let achievements = extractor.extract_achievements(&blob).await;
        assert_eq!(achievements, vec!["Shipped the exporter on Tuesday"]);

        let learnings = extractor.extract_learnings(&blob).await;
        assert_eq!(learnings, vec!["Learned a lot about tokio internals"]);

        let insights = extractor.extract_insights(&blob).await;
        assert_eq!(insights, vec!["Realized the cache was stale"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_keyword_match_returns_empty_not_error() {
        let extractor = ContentExtractor::new(FailingProvider::shared(), limiter());
        let blob = plain("The weather was nice. Meetings all day.");

        assert!(extractor.extract_achievements(&blob).await.is_empty());
        assert!(extractor.extract_insights(&blob).await.is_empty());
        assert!(extractor.extract_learnings(&blob).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_respects_caps() {
        let extractor = ContentExtractor::new(FailingProvider::shared(), limiter());
        let sentences: Vec<String> = (0..10)
            .map(|i| format!("Shipped component number {i} today"))
            .collect();
        let blob = plain(&sentences.join(". "));

        let achievements = extractor.extract_achievements(&blob).await;
        assert_eq!(achievements.len(), caps::MAX_ACHIEVEMENTS);
    }

    #[test]
    fn test_deduplicate_and_rank() {
        let items = vec![
            "short".to_string(),
            "Shipped the CSV exporter".to_string(),
            "Shipped the CSV exporter".to_string(),
            "Fixed the long-standing auth session bug".to_string(),
        ];
        let ranked = deduplicate_and_rank(items);
        assert_eq!(
            ranked,
            vec![
                "Fixed the long-standing auth session bug",
                "Shipped the CSV exporter"
            ]
        );
    }

    #[test]
    fn test_clean_lightweight_markup() {
        let content = "# Week 34\n\n- **Shipped** the [exporter](https://example.com)\n---\n";
        let cleaned = clean_content(content, ContentType::LightweightMarkup);
        assert_eq!(cleaned, "Week 34\n\nShipped the exporter");
    }

    #[test]
    fn test_list_markers_keep_blank_lines() {
        let content = "Done this week:\n\n- Shipped exporter\n\n- Fixed parser";
        let cleaned = clean_content(content, ContentType::LightweightMarkup);
        assert_eq!(cleaned, "Done this week:\n\nShipped exporter\n\nFixed parser");
    }

    #[test]
    fn test_clean_structured_notes() {
        let content = "- [x] Shipped exporter\n> carried over\n* [ ] Write docs";
        let cleaned = clean_content(content, ContentType::StructuredNotes);
        assert!(!cleaned.contains("[x]"));
        assert!(!cleaned.contains('>'));
        assert!(cleaned.contains("Shipped exporter"));
    }

    #[test]
    fn test_plain_text_untouched() {
        let cleaned = clean_content("  just text with * stars *  ", ContentType::PlainText);
        assert_eq!(cleaned, "just text with * stars *");
    }
}
