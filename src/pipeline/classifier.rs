//! Activity Classifier
//!
//! Maps free-text activity strings onto the closed category taxonomy via
//! a rate-limited generation call, with the deterministic keyword rules
//! as fallback. Classification never fails outward: a model error or an
//! out-of-taxonomy label degrades to `keyword_classify`, so every record
//! yields exactly one categorized activity.

use tracing::debug;

use super::keywords::{assess_impact, business_description, keyword_classify};
use crate::ai::{DigestPrompts, SharedProvider, SharedRateLimiter, parse_label};
use crate::types::{ActivityRecord, CategorizedActivity, Category, Result, SourceKind};

pub struct Classifier {
    provider: SharedProvider,
    limiter: SharedRateLimiter,
}

impl Classifier {
    pub fn new(provider: SharedProvider, limiter: SharedRateLimiter) -> Self {
        Self { provider, limiter }
    }

    /// Classify one activity string. Never fails outward.
    pub async fn classify(&self, text: &str) -> Category {
        match self.model_classify(text).await {
            Ok(category) => category,
            Err(err) => {
                let category = keyword_classify(text);
                debug!(
                    %category,
                    "model classification failed, using keyword fallback: {err}"
                );
                category
            }
        }
    }

    /// Classify a batch of texts from one source. Items are processed
    /// sequentially and independently: order preserved, one output per
    /// input, and a single item's failure degrades only that item.
    pub async fn classify_batch(
        &self,
        texts: &[String],
        source: SourceKind,
    ) -> Vec<CategorizedActivity> {
        let records: Vec<ActivityRecord> = texts
            .iter()
            .map(|text| ActivityRecord::new(text.clone(), source))
            .collect();
        self.classify_records(&records).await
    }

    /// Classify pre-built records (mixed sources), sequentially so the
    /// shared rate-limit window is never exceeded by concurrent bursts.
    pub async fn classify_records(
        &self,
        records: &[ActivityRecord],
    ) -> Vec<CategorizedActivity> {
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let category = self.classify(&record.text).await;
            out.push(CategorizedActivity {
                text: record.text.clone(),
                source: record.source,
                category,
                impact: assess_impact(&record.text, category),
                business_description: business_description(&record.text),
            });
        }
        out
    }

    async fn model_classify(&self, text: &str) -> Result<Category> {
        let prompt = DigestPrompts::classify(text);
        let raw = self
            .limiter
            .execute("classify", || self.provider.generate(&prompt))
            .await?;
        // Out-of-taxonomy labels are parse errors, which route to the
        // keyword fallback in the caller.
        parse_label(&raw).parse()
    }
}
