//! Digest Pipeline Orchestrator
//!
//! Composes classifier, aggregator, content extractor, highlight
//! ranking, and email composition into one end-to-end run:
//! activity sources -> categorized summary -> email text.
//!
//! Every stage owns a deterministic fallback, so failure anywhere
//! degrades output quality but never aborts the run. The worst case is
//! a template-rendered, lower-quality-but-present digest; with zero
//! input the run short-circuits to the `no-data-found` placeholder
//! before any model call. Only construction can fail, and only with a
//! configuration error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::aggregator::Aggregator;
use super::classifier::Classifier;
use super::email::{EmailComposer, render_template};
use super::extractor::ContentExtractor;
use super::highlights::{HighlightExtractor, confidence_score};
use super::keywords::{assess_impact, business_description, keyword_classify};
use crate::ai::{
    DigestPrompts, ModelJson, SharedProvider, SharedRateLimiter, parse_model_json,
};
use crate::constants::comprehensive;
use crate::observe::{SharedObserver, Stage, StageEvent, StageOutcome};
use crate::types::{
    Achievement, ActivityRecord, CategorizedActivity, Category, Commit, ContentBlob, DateRange,
    ImpactLevel, NO_DATA_ID, PullRequest, SourceKind, WeeklySummary,
};

// =============================================================================
// Execution Mode
// =============================================================================

/// Caller-supplied execution mode; never inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Separate rate-limited calls per stage: higher fidelity, more calls
    #[default]
    Detailed,
    /// One comprehensive prompt collapsing classification and
    /// summarization: fewer calls, coarser fidelity
    Optimized,
}

impl std::fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detailed => write!(f, "detailed"),
            Self::Optimized => write!(f, "optimized"),
        }
    }
}

impl std::str::FromStr for PipelineMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detailed" => Ok(Self::Detailed),
            "optimized" => Ok(Self::Optimized),
            other => Err(format!(
                "Invalid mode '{other}'. Valid values: detailed, optimized"
            )),
        }
    }
}

// =============================================================================
// Input / Output
// =============================================================================

/// Everything one digest run consumes, delivered by the external
/// source-control and supplementary-content collaborators, already
/// filtered to the requested date range.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DigestInput {
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
    #[serde(default)]
    pub notes: Vec<ContentBlob>,
}

impl DigestInput {
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
            && self.pull_requests.is_empty()
            && self.notes.iter().all(|n| n.content.trim().is_empty())
    }
}

/// Output of one digest run
#[derive(Debug, Clone, Serialize)]
pub struct DigestReport {
    pub achievements: Vec<Achievement>,
    pub summary: WeeklySummary,
    /// Plain-text email draft, always present
    pub email: String,
    /// Diagnostic confidence in [0, 100]; nothing branches on this
    pub confidence: u8,
    pub mode: PipelineMode,
    /// Generation calls this run issued, successful or not
    pub model_calls: u32,
}

// =============================================================================
// Pipeline
// =============================================================================

pub struct DigestPipeline {
    classifier: Classifier,
    aggregator: Aggregator,
    extractor: ContentExtractor,
    highlighter: HighlightExtractor,
    composer: EmailComposer,
    provider: SharedProvider,
    limiter: SharedRateLimiter,
    observer: SharedObserver,
    mode: PipelineMode,
}

impl DigestPipeline {
    /// All collaborators are injected; the pipeline owns no globals.
    pub fn new(
        provider: SharedProvider,
        limiter: SharedRateLimiter,
        observer: SharedObserver,
        mode: PipelineMode,
    ) -> Self {
        Self {
            classifier: Classifier::new(provider.clone(), limiter.clone()),
            aggregator: Aggregator::new(provider.clone(), limiter.clone()),
            extractor: ContentExtractor::new(provider.clone(), limiter.clone()),
            highlighter: HighlightExtractor::new(provider.clone(), limiter.clone()),
            composer: EmailComposer::new(provider.clone(), limiter.clone()),
            provider,
            limiter,
            observer,
            mode,
        }
    }

    /// Run one analysis request end to end. Infallible by design: every
    /// stage degrades through its fallback instead of erroring.
    pub async fn run(&self, input: &DigestInput, range: DateRange) -> DigestReport {
        // The limiter is shared process-wide, so per-run call counts
        // are the difference of two monotonic readings.
        let calls_at_start = self.limiter.total_calls();

        // Collect
        if input.is_empty() {
            self.emit(Stage::Collect, StageOutcome::Skipped, 0);
            return self.placeholder_report(range, calls_at_start);
        }
        let records = self.collect(input).await;
        if records.is_empty() {
            self.emit(Stage::Collect, StageOutcome::Skipped, 0);
            return self.placeholder_report(range, calls_at_start);
        }
        self.emit(Stage::Collect, StageOutcome::Completed, records.len());

        // Classify (+ summarize, in optimized mode)
        let (activities, classify_outcome) = match self.mode {
            PipelineMode::Detailed => {
                let activities = self.classifier.classify_records(&records).await;
                (activities, StageOutcome::Completed)
            }
            PipelineMode::Optimized => match self.comprehensive(&records, &range).await {
                Some(activities) => (activities, StageOutcome::Completed),
                None => (fallback_classify(&records), StageOutcome::Fallback),
            },
        };
        self.emit(Stage::Classify, classify_outcome, activities.len());

        // Summarize. The optimized path already produced business-ready
        // descriptions in its single call, so per-group notes are skipped.
        let grouped = Aggregator::group_by_category(&activities);
        let mut summary = Aggregator::map_to_buckets(&grouped);
        if self.mode == PipelineMode::Detailed {
            let group_notes = self.aggregator.summarize_groups(&grouped).await;
            if !group_notes.is_empty() {
                summary.notes = Some(group_notes);
            }
        }
        self.emit(Stage::Summarize, StageOutcome::Completed, summary.total_items());

        // Highlights (merged in when the summary has none of its own)
        if summary.highlights.is_none() {
            let highlights = self.highlighter.extract(&activities).await;
            self.emit(Stage::Highlights, StageOutcome::Completed, highlights.len());
            if !highlights.is_empty() {
                summary.highlights = Some(highlights);
            }
        }

        let achievements = to_achievements(&activities);
        let confidence = confidence_score(&activities);

        // Compose
        let email = self.composer.compose(&summary, &achievements, &range).await;
        self.emit(Stage::Compose, StageOutcome::Completed, 1);

        DigestReport {
            achievements,
            summary,
            email,
            confidence,
            mode: self.mode,
            model_calls: self.calls_since(calls_at_start),
        }
    }

    /// Gather activity records from all sources. Commits and pull
    /// requests map directly; note achievements go through the content
    /// extractor (model call with keyword fallback).
    async fn collect(&self, input: &DigestInput) -> Vec<ActivityRecord> {
        let mut records = Vec::new();

        for commit in &input.commits {
            let message = commit.message.trim();
            if !message.is_empty() {
                records.push(ActivityRecord::new(message, SourceKind::Commit));
            }
        }

        for pr in &input.pull_requests {
            records.push(ActivityRecord::new(pr.to_activity_text(), SourceKind::PullRequest));
        }

        for blob in &input.notes {
            for achievement in self.extractor.extract_achievements(blob).await {
                records.push(ActivityRecord::new(achievement, SourceKind::Note));
            }
        }

        records
    }

    /// Optimized path: one comprehensive call producing categorized
    /// achievements directly. `None` means the caller should fall back
    /// to keyword-only classification.
    async fn comprehensive(
        &self,
        records: &[ActivityRecord],
        range: &DateRange,
    ) -> Option<Vec<CategorizedActivity>> {
        let block = records
            .iter()
            .map(|r| format!("[{}] {}", r.source, r.text))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = DigestPrompts::comprehensive(&block, range);
        let raw = match self
            .limiter
            .execute("comprehensive", || self.provider.generate(&prompt))
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                debug!("comprehensive call failed: {err}");
                return None;
            }
        };

        let entries = match parse_model_json(&raw) {
            ModelJson::Parsed(Value::Array(entries)) => entries,
            other => {
                debug!(parsed = other.is_parsed(), "comprehensive response unusable");
                return None;
            }
        };

        let activities: Vec<CategorizedActivity> = entries
            .iter()
            .filter_map(parse_comprehensive_entry)
            .take(comprehensive::MAX_ACHIEVEMENTS)
            .collect();

        (!activities.is_empty()).then_some(activities)
    }

    /// Terminal state for empty input: fixed placeholder, zero model calls
    fn placeholder_report(&self, range: DateRange, calls_at_start: u64) -> DigestReport {
        let placeholder = Achievement {
            id: NO_DATA_ID.to_string(),
            description: format!(
                "No development activity was found for {}.",
                range.label()
            ),
            category: Category::Chore,
            impact: ImpactLevel::Low,
        };
        let summary = WeeklySummary::default();
        let email = render_template(&summary, std::slice::from_ref(&placeholder), &range);
        self.emit(Stage::Compose, StageOutcome::Fallback, 1);

        DigestReport {
            achievements: vec![placeholder],
            summary,
            email,
            confidence: 0,
            mode: self.mode,
            model_calls: self.calls_since(calls_at_start),
        }
    }

    fn calls_since(&self, at_start: u64) -> u32 {
        self.limiter.total_calls().saturating_sub(at_start) as u32
    }

    fn emit(&self, stage: Stage, outcome: StageOutcome, items: usize) {
        self.observer.on_stage(StageEvent {
            stage,
            outcome,
            items,
        });
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Keyword-only classification, the optimized path's offline fallback
pub fn fallback_classify(records: &[ActivityRecord]) -> Vec<CategorizedActivity> {
    records
        .iter()
        .map(|record| {
            let category = keyword_classify(&record.text);
            CategorizedActivity {
                text: record.text.clone(),
                source: record.source,
                category,
                impact: assess_impact(&record.text, category),
                business_description: business_description(&record.text),
            }
        })
        .collect()
}

fn to_achievements(activities: &[CategorizedActivity]) -> Vec<Achievement> {
    activities
        .iter()
        .enumerate()
        .map(|(i, activity)| Achievement {
            id: format!("activity-{}", i + 1),
            description: activity.business_description.clone(),
            category: activity.category,
            impact: activity.impact,
        })
        .collect()
}

/// Parse one `{description, category, impact}` object from the
/// comprehensive response, healing missing fields with the keyword rules.
fn parse_comprehensive_entry(entry: &Value) -> Option<CategorizedActivity> {
    let description = entry.get("description")?.as_str()?.trim();
    if description.is_empty() {
        return None;
    }

    let category = entry
        .get("category")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| keyword_classify(description));

    let impact = match entry.get("impact").and_then(Value::as_str) {
        Some("high") => ImpactLevel::High,
        Some("medium") => ImpactLevel::Medium,
        Some("low") => ImpactLevel::Low,
        _ => assess_impact(description, category),
    };

    Some(CategorizedActivity {
        text: description.to_string(),
        source: SourceKind::Manual,
        category,
        impact,
        business_description: business_description(description),
    })
}
