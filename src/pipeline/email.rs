//! Email Prose Composer
//!
//! Final pipeline stage: one model call renders the weekly summary and
//! date range into plain-text email prose. On failure the deterministic
//! template guarantees output: subject, greeting, one bullet per
//! achievement flattened across all buckets, closing.

use tracing::debug;

use crate::ai::{DigestPrompts, SharedProvider, SharedRateLimiter};
use crate::types::{Achievement, DateRange, Result, WeeklySummary};

pub struct EmailComposer {
    provider: SharedProvider,
    limiter: SharedRateLimiter,
}

impl EmailComposer {
    pub fn new(provider: SharedProvider, limiter: SharedRateLimiter) -> Self {
        Self { provider, limiter }
    }

    /// Render the digest email. Always returns text.
    pub async fn compose(
        &self,
        summary: &WeeklySummary,
        achievements: &[Achievement],
        range: &DateRange,
    ) -> String {
        match self.model_compose(summary, range).await {
            Ok(prose) => prose,
            Err(err) => {
                debug!("email prose call failed, rendering template: {err}");
                render_template(summary, achievements, range)
            }
        }
    }

    async fn model_compose(&self, summary: &WeeklySummary, range: &DateRange) -> Result<String> {
        let prompt = DigestPrompts::email(summary, range);
        let raw = self
            .limiter
            .execute("compose_email", || self.provider.generate(&prompt))
            .await?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(crate::types::DigestError::LlmApi(
                "empty email prose".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }
}

/// Deterministic email template, the pipeline's terminal fallback
pub fn render_template(
    summary: &WeeklySummary,
    achievements: &[Achievement],
    range: &DateRange,
) -> String {
    let mut email = String::new();
    email.push_str(&format!("Subject: Weekly Update: {}\n\n", range.label()));
    email.push_str("Hi there,\n\n");
    email.push_str("Here's a summary of what was accomplished this week:\n\n");

    // One bullet per achievement, flattened across all buckets; the
    // achievement list covers the empty-summary placeholder case.
    let bullets: Vec<&str> = if summary.is_empty() {
        achievements.iter().map(|a| a.description.as_str()).collect()
    } else {
        summary.flattened()
    };
    for bullet in bullets {
        email.push_str(&format!("- {bullet}\n"));
    }

    if let Some(highlights) = summary.highlights.as_deref().filter(|h| !h.is_empty()) {
        email.push_str("\nHighlights:\n");
        for highlight in highlights {
            email.push_str(&format!("- {highlight}\n"));
        }
    }

    email.push_str("\nBest regards\n");
    email
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::testing::{FailingProvider, ScriptedProvider};
    use crate::ai::{RateLimitConfig, RateLimiter};
    use crate::types::{Category, ImpactLevel, NO_DATA_ID};
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 8, 17).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
        )
    }

    fn summary() -> WeeklySummary {
        WeeklySummary {
            features: vec!["Add CSV export.".into()],
            fixes: vec!["Null pointer in parser.".into()],
            refactors: vec![],
            highlights: None,
            notes: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_compose_uses_model_prose() {
        let composer = EmailComposer::new(
            ScriptedProvider::shared(vec!["Subject: Great week!\n\nWe shipped exports."]),
            RateLimiter::shared(RateLimitConfig::default()),
        );
        let email = composer.compose(&summary(), &[], &range()).await;
        assert_eq!(email, "Subject: Great week!\n\nWe shipped exports.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_compose_falls_back_to_template() {
        let composer = EmailComposer::new(
            FailingProvider::shared(),
            RateLimiter::shared(RateLimitConfig::default()),
        );
        let email = composer.compose(&summary(), &[], &range()).await;
        assert!(email.starts_with("Subject: Weekly Update: Aug 17 - Aug 23, 2026"));
        assert!(email.contains("- Add CSV export."));
        assert!(email.contains("- Null pointer in parser."));
        assert!(email.ends_with("Best regards\n"));
    }

    #[test]
    fn test_template_bullets_flatten_buckets_in_order() {
        let email = render_template(&summary(), &[], &range());
        let features_pos = email.find("- Add CSV export.").unwrap();
        let fixes_pos = email.find("- Null pointer in parser.").unwrap();
        assert!(features_pos < fixes_pos);
    }

    #[test]
    fn test_template_uses_achievements_when_summary_empty() {
        let placeholder = Achievement {
            id: NO_DATA_ID.to_string(),
            description: "No tracked activity found for Aug 17 - Aug 23, 2026.".into(),
            category: Category::Chore,
            impact: ImpactLevel::Low,
        };
        let email = render_template(&WeeklySummary::default(), &[placeholder], &range());
        assert!(email.contains("- No tracked activity found for Aug 17 - Aug 23, 2026."));
    }

    #[test]
    fn test_template_includes_highlights_section() {
        let mut s = summary();
        s.highlights = Some(vec!["Add CSV export.".into()]);
        let email = render_template(&s, &[], &range());
        assert!(email.contains("Highlights:\n- Add CSV export."));
    }
}
