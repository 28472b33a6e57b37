//! Core Domain Types
//!
//! Data model for the digest pipeline: activity records, the closed
//! category taxonomy, categorized activities, achievements, and the
//! weekly summary consumed by the email composer.

pub mod error;

pub use error::{DigestError, ErrorCategory, ErrorClassifier, LlmError, Result};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Activity Taxonomy
// =============================================================================

/// Where an activity record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Commit,
    PullRequest,
    Note,
    Manual,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Commit => write!(f, "commit"),
            Self::PullRequest => write!(f, "pull_request"),
            Self::Note => write!(f, "note"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Closed classification taxonomy for developer activity.
///
/// Every activity is classified into exactly one of these values; the
/// keyword fallback guarantees membership even when the model backend
/// returns garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Feature,
    Fix,
    Refactor,
    Docs,
    Test,
    Chore,
    Performance,
    Security,
}

impl Category {
    /// All taxonomy members in canonical iteration order
    pub const ALL: [Category; 8] = [
        Category::Feature,
        Category::Fix,
        Category::Refactor,
        Category::Docs,
        Category::Test,
        Category::Chore,
        Category::Performance,
        Category::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Fix => "fix",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Test => "test",
            Self::Chore => "chore",
            Self::Performance => "performance",
            Self::Security => "security",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = DigestError;

    /// Parse a model-returned label. Rejects anything outside the taxonomy
    /// so callers are forced through the keyword fallback.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "feature" | "feat" => Ok(Self::Feature),
            "fix" | "bugfix" => Ok(Self::Fix),
            "refactor" | "refactoring" => Ok(Self::Refactor),
            "docs" | "documentation" => Ok(Self::Docs),
            "test" | "tests" => Ok(Self::Test),
            "chore" => Ok(Self::Chore),
            "performance" | "perf" => Ok(Self::Performance),
            "security" => Ok(Self::Security),
            other => Err(DigestError::LlmApi(format!(
                "Label '{other}' is outside the category taxonomy"
            ))),
        }
    }
}

/// Heuristic business impact of one activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

// =============================================================================
// Activity Records
// =============================================================================

/// One unit of developer work to be classified. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Raw description: commit message, "PR #N: title - body", or note sentence
    pub text: String,
    pub source: SourceKind,
}

impl ActivityRecord {
    pub fn new(text: impl Into<String>, source: SourceKind) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// An [`ActivityRecord`] enriched with classification results.
///
/// Created once by the classifier, read-only afterward; the aggregator
/// groups but never mutates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedActivity {
    pub text: String,
    pub source: SourceKind,
    pub category: Category,
    pub impact: ImpactLevel,
    /// Cleaned, human-readable rewrite of `text`
    pub business_description: String,
}

/// One business-readable achievement in the final digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Stable slug, e.g. "activity-3" or "no-data-found"
    pub id: String,
    pub description: String,
    pub category: Category,
    pub impact: ImpactLevel,
}

/// Achievement id used for the empty-input placeholder
pub const NO_DATA_ID: &str = "no-data-found";

// =============================================================================
// Weekly Summary
// =============================================================================

/// The pipeline's externally consumed output buckets.
///
/// Every categorized activity's business description lands in exactly one
/// of the three buckets via a fixed category mapping. `highlights` and
/// `notes` are independently derived and may overlap the buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub features: Vec<String>,
    pub fixes: Vec<String>,
    pub refactors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

impl WeeklySummary {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty() && self.fixes.is_empty() && self.refactors.is_empty()
    }

    /// All bucket entries in features/fixes/refactors order
    pub fn flattened(&self) -> Vec<&str> {
        self.features
            .iter()
            .chain(self.fixes.iter())
            .chain(self.refactors.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn total_items(&self) -> usize {
        self.features.len() + self.fixes.len() + self.refactors.len()
    }
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive date range covered by one digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Human-readable label, e.g. "Aug 17 - Aug 23, 2026"
    pub fn label(&self) -> String {
        if self.start.format("%Y").to_string() == self.end.format("%Y").to_string() {
            format!(
                "{} - {}",
                self.start.format("%b %-d"),
                self.end.format("%b %-d, %Y")
            )
        } else {
            format!(
                "{} - {}",
                self.start.format("%b %-d, %Y"),
                self.end.format("%b %-d, %Y")
            )
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// =============================================================================
// Source Inputs (delivered by external collaborators, already date-filtered)
// =============================================================================

/// One commit from the source-control provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub message: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// One pull request from the source-control provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Render into the canonical activity text form
    pub fn to_activity_text(&self) -> String {
        match self.body.as_deref().map(str::trim) {
            Some(body) if !body.is_empty() => {
                format!("PR #{}: {} - {}", self.number, self.title, body)
            }
            _ => format!("PR #{}: {}", self.number, self.title),
        }
    }
}

/// Declared format of a supplementary content blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Exported notes with heavy structural markup
    StructuredNotes,
    /// Markdown-style lightweight markup
    LightweightMarkup,
    PlainText,
}

/// Raw supplementary text tagged with its declared content type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlob {
    pub content: String,
    pub content_type: ContentType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_str(cat.as_str()).unwrap(), cat);
        }
    }

    #[test]
    fn test_category_rejects_out_of_taxonomy() {
        assert!(Category::from_str("enhancement").is_err());
        assert!(Category::from_str("").is_err());
        assert!(Category::from_str("the category is: feature!").is_err());
    }

    #[test]
    fn test_category_accepts_aliases() {
        assert_eq!(Category::from_str("feat").unwrap(), Category::Feature);
        assert_eq!(Category::from_str("PERF").unwrap(), Category::Performance);
        assert_eq!(Category::from_str(" bugfix ").unwrap(), Category::Fix);
    }

    #[test]
    fn test_impact_ordering() {
        assert!(ImpactLevel::High > ImpactLevel::Medium);
        assert!(ImpactLevel::Medium > ImpactLevel::Low);
    }

    #[test]
    fn test_pull_request_activity_text() {
        let pr = PullRequest {
            number: 42,
            title: "Add CSV export".into(),
            body: Some("Exports reports as CSV".into()),
            state: Some("merged".into()),
            merged_at: None,
        };
        assert_eq!(
            pr.to_activity_text(),
            "PR #42: Add CSV export - Exports reports as CSV"
        );

        let bare = PullRequest {
            number: 7,
            title: "Fix typo".into(),
            body: Some("   ".into()),
            state: None,
            merged_at: None,
        };
        assert_eq!(bare.to_activity_text(), "PR #7: Fix typo");
    }

    #[test]
    fn test_date_range_label() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 8, 17).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
        );
        assert_eq!(range.label(), "Aug 17 - Aug 23, 2026");

        let cross_year = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 12, 29).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(),
        );
        assert_eq!(cross_year.label(), "Dec 29, 2025 - Jan 4, 2026");
    }

    #[test]
    fn test_summary_flattened_order() {
        let summary = WeeklySummary {
            features: vec!["A".into()],
            fixes: vec!["B".into()],
            refactors: vec!["C".into()],
            highlights: None,
            notes: None,
        };
        assert_eq!(summary.flattened(), vec!["A", "B", "C"]);
        assert_eq!(summary.total_items(), 3);
        assert!(!summary.is_empty());
        assert!(WeeklySummary::default().is_empty());
    }
}
