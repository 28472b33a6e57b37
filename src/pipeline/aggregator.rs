//! Activity Aggregator
//!
//! Groups classified activities by category and maps them onto the three
//! summary buckets. The category-to-bucket mapping is a fixed output
//! contract: feature+performance+security feed `features`, fix feeds
//! `fixes`, refactor+docs+test+chore feed `refactors`.
//!
//! Per-group prose summaries are model-generated with a literal-text
//! fallback; a singleton group skips the model entirely.

use tracing::debug;

use super::keywords::business_description;
use crate::ai::{DigestPrompts, SharedProvider, SharedRateLimiter};
use crate::types::{CategorizedActivity, Category, Result, WeeklySummary};

pub struct Aggregator {
    provider: SharedProvider,
    limiter: SharedRateLimiter,
}

impl Aggregator {
    pub fn new(provider: SharedProvider, limiter: SharedRateLimiter) -> Self {
        Self { provider, limiter }
    }

    /// Stable grouping: non-empty groups in taxonomy order, insertion
    /// order preserved within each group. Flattening the result yields
    /// the input multiset exactly.
    pub fn group_by_category(
        activities: &[CategorizedActivity],
    ) -> Vec<(Category, Vec<CategorizedActivity>)> {
        Category::ALL
            .iter()
            .filter_map(|&category| {
                let group: Vec<CategorizedActivity> = activities
                    .iter()
                    .filter(|a| a.category == category)
                    .cloned()
                    .collect();
                (!group.is_empty()).then_some((category, group))
            })
            .collect()
    }

    /// Fixed category-to-bucket mapping. Every activity's business
    /// description lands in exactly one bucket.
    pub fn map_to_buckets(
        grouped: &[(Category, Vec<CategorizedActivity>)],
    ) -> WeeklySummary {
        let mut summary = WeeklySummary::default();

        for (category, group) in grouped {
            let bucket = match category {
                Category::Feature | Category::Performance | Category::Security => {
                    &mut summary.features
                }
                Category::Fix => &mut summary.fixes,
                Category::Refactor | Category::Docs | Category::Test | Category::Chore => {
                    &mut summary.refactors
                }
            };
            bucket.extend(group.iter().map(|a| a.business_description.clone()));
        }

        summary
    }

    /// Produce one business-friendly sentence for a category group.
    ///
    /// Empty group: `None`. Singleton: the cleaned text, no model call,
    /// fully deterministic. Larger groups: one model call, falling back
    /// to the first member's cleaned text.
    pub async fn summarize_group(&self, texts: &[String], category: Category) -> Option<String> {
        match texts {
            [] => None,
            [only] => Some(business_description(only)),
            _ => match self.model_summarize(texts, category).await {
                Ok(summary) => Some(summary),
                Err(err) => {
                    debug!(%category, "group summary failed, using first member: {err}");
                    Some(business_description(&texts[0]))
                }
            },
        }
    }

    /// One prose summary per group, in group order. Feeds the summary's
    /// independent `notes` field.
    pub async fn summarize_groups(
        &self,
        grouped: &[(Category, Vec<CategorizedActivity>)],
    ) -> Vec<String> {
        let mut notes = Vec::new();
        for (category, group) in grouped {
            let texts: Vec<String> = group.iter().map(|a| a.text.clone()).collect();
            if let Some(summary) = self.summarize_group(&texts, *category).await {
                notes.push(summary);
            }
        }
        notes
    }

    async fn model_summarize(&self, texts: &[String], category: Category) -> Result<String> {
        let prompt = DigestPrompts::summarize_group(texts, category);
        let raw = self
            .limiter
            .execute("summarize_group", || self.provider.generate(&prompt))
            .await?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(crate::types::DigestError::LlmApi(
                "empty group summary".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }
}
