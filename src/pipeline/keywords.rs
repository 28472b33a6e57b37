//! Consolidated Keyword Rule Tables
//!
//! Single home for every deterministic heuristic the pipeline falls back
//! to when a generation call fails: category rules, impact vocabularies,
//! highlight vocabulary, extraction keyword sets, sentence splitting, and
//! business-description cleanup.
//!
//! Rule order is part of the output contract. Category rules are
//! evaluated feature, fix, refactor, docs, test, performance, security,
//! then default chore; first match wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Category, ImpactLevel};

// =============================================================================
// Category Rules
// =============================================================================

/// Ordered category rules; evaluated top to bottom, first match wins
const CATEGORY_RULES: [(Category, &[&str]); 7] = [
    (
        Category::Feature,
        &[
            "feat", "add", "implement", "introduce", "new ", "launch", "create", "support",
        ],
    ),
    (
        Category::Fix,
        &["fix", "bug", "patch", "resolve", "correct", "repair", "crash"],
    ),
    (
        Category::Refactor,
        &[
            "refactor",
            "restructure",
            "rework",
            "clean up",
            "cleanup",
            "simplify",
            "extract",
            "rename",
        ],
    ),
    (
        Category::Docs,
        &["doc", "readme", "changelog", "comment", "guide"],
    ),
    (
        Category::Test,
        &["test", "spec", "coverage", "assert"],
    ),
    (
        Category::Performance,
        &[
            "perf",
            "optimiz",
            "speed",
            "faster",
            "latency",
            "cache",
            "throughput",
        ],
    ),
    (
        Category::Security,
        &[
            "security",
            "vulnerab",
            "cve",
            "sanitiz",
            "injection",
            "xss",
            "secret",
        ],
    ),
];

/// Deterministic keyword classification. Always returns a taxonomy
/// member; anything unmatched is a chore.
pub fn keyword_classify(text: &str) -> Category {
    let lower = text.to_lowercase();
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return category;
        }
    }
    Category::Chore
}

// =============================================================================
// Impact Vocabulary
// =============================================================================

const HIGH_IMPACT_KEYWORDS: &[&str] = &[
    "major",
    "critical",
    "breaking",
    "severe",
    "urgent",
    "significant",
    "vulnerability",
    "outage",
    "data loss",
];

const MEDIUM_IMPACT_KEYWORDS: &[&str] = &[
    "improve", "enhance", "update", "upgrade", "optimize", "extend", "migrate",
];

/// Pure impact assessment from category and keyword presence
pub fn assess_impact(text: &str, category: Category) -> ImpactLevel {
    let lower = text.to_lowercase();

    if matches!(category, Category::Security | Category::Performance)
        || HIGH_IMPACT_KEYWORDS.iter().any(|kw| lower.contains(kw))
    {
        return ImpactLevel::High;
    }

    if matches!(category, Category::Feature | Category::Fix)
        || MEDIUM_IMPACT_KEYWORDS.iter().any(|kw| lower.contains(kw))
    {
        return ImpactLevel::Medium;
    }

    ImpactLevel::Low
}

// =============================================================================
// Highlight Vocabulary
// =============================================================================

/// Vocabulary marking an activity as highlight-worthy in the fallback scan
pub const HIGHLIGHT_KEYWORDS: &[&str] = &[
    "launch",
    "ship",
    "release",
    "major",
    "critical",
    "milestone",
    "breaking",
    "security",
    "performance",
    "complete",
];

pub fn is_highlight_worthy(text: &str) -> bool {
    let lower = text.to_lowercase();
    HIGHLIGHT_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

// =============================================================================
// Extraction Keyword Sets
// =============================================================================

/// Distinct keyword sets per extraction kind, for the sentence-filter fallback
pub const ACHIEVEMENT_KEYWORDS: &[&str] = &[
    "completed",
    "finished",
    "shipped",
    "launched",
    "delivered",
    "implemented",
    "fixed",
    "built",
    "released",
    "deployed",
    "merged",
];

pub const INSIGHT_KEYWORDS: &[&str] = &[
    "realized",
    "discovered",
    "noticed",
    "found that",
    "insight",
    "turns out",
    "understood",
    "root cause",
];

pub const LEARNING_KEYWORDS: &[&str] = &[
    "learned",
    "studied",
    "practiced",
    "explored",
    "read about",
    "picked up",
    "tried out",
];

// =============================================================================
// Sentence Splitting
// =============================================================================

/// Split free text into trimmed, non-empty sentences on `. ! ? ;` and
/// newlines.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// =============================================================================
// Business Description Cleanup
// =============================================================================

static TECHNICAL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(feat|feature|fix|bugfix|hotfix|refactor|docs?|test|chore|perf|performance|security|style|build|ci)(\([^)]*\))?!?:\s*",
    )
    .expect("technical prefix pattern is valid")
});

static PR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PR #\d+:\s*").expect("PR prefix pattern is valid"));

/// Rewrite raw activity text into a business-readable description:
/// technical prefixes stripped, first letter capitalized, terminal
/// punctuation ensured.
pub fn business_description(text: &str) -> String {
    let mut cleaned = text.trim().to_string();
    cleaned = PR_PREFIX.replace(&cleaned, "").to_string();
    cleaned = TECHNICAL_PREFIX.replace(&cleaned, "").to_string();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return String::new();
    }

    let mut chars = cleaned.chars();
    let mut result: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    if !result.ends_with(['.', '!', '?']) {
        result.push('.');
    }

    result
}
