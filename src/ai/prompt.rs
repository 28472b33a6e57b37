//! Prompt Builder System
//!
//! Standardized prompt construction for generation calls.
//! Provides consistent structure across all pipeline prompts.
//!
//! ## Design Principles
//!
//! 1. **Role Definition**: Clear AI role for each task
//! 2. **Structured Instructions**: Numbered steps
//! 3. **Input Sections**: Clearly delimited activity text
//! 4. **Output Contract**: Exact response shape, since every response is
//!    parsed with a deterministic fallback behind it

use crate::constants::comprehensive::{MAX_ACHIEVEMENTS, MIN_ACHIEVEMENTS};
use crate::types::{Category, DateRange, WeeklySummary};

/// Prompt section types
#[derive(Debug, Clone)]
enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered instructions
    Instructions(Vec<String>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Exact output shape the caller will parse
    OutputContract(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add numbered instructions
    pub fn instructions(mut self, instructions: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Instructions(
            instructions.into_iter().map(String::from).collect(),
        ));
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add the output contract
    pub fn output(mut self, contract: &str) -> Self {
        self.sections
            .push(PromptSection::OutputContract(contract.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Instructions(instructions) => {
                    prompt.push_str("<INSTRUCTIONS>\n");
                    for (i, step) in instructions.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, step));
                    }
                    prompt.push_str("</INSTRUCTIONS>\n\n");
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::OutputContract(contract) => {
                    prompt.push_str("<OUTPUT>\n");
                    prompt.push_str(&contract);
                    prompt.push_str("\n</OUTPUT>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Digest Prompt Templates
// =============================================================================

/// Preset prompts for each pipeline stage
pub struct DigestPrompts;

impl DigestPrompts {
    /// Classify one activity into the closed taxonomy
    pub fn classify(activity_text: &str) -> String {
        let labels = Category::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        PromptBuilder::new()
            .role("software release manager", "categorizing development work")
            .instructions(vec![
                "Read the development activity below",
                "Pick the single best-fitting category",
                "Respond with the category label and nothing else",
            ])
            .section("Activity", activity_text)
            .output(&format!("One word from: {labels}"))
            .build()
    }

    /// Combine one category group into a single business-friendly sentence
    pub fn summarize_group(texts: &[String], category: Category) -> String {
        PromptBuilder::new()
            .role(
                "technical writer",
                "summarizing engineering work for a business audience",
            )
            .instructions(vec![
                "Read the related development activities below",
                "Combine them into one concise, business-friendly sentence",
                "Avoid jargon, branch names, and ticket numbers",
            ])
            .section(
                &format!("{} activities", category),
                &numbered_list(texts),
            )
            .output("One plain-text sentence, no bullets, no preamble")
            .build()
    }

    /// Extract task-specific statements from supplementary text
    pub fn extract(kind: ExtractionKind, text: &str) -> String {
        let (noun, guidance) = match kind {
            ExtractionKind::Achievements => (
                "achievements",
                "Concrete completed work: things shipped, fixed, launched, or delivered",
            ),
            ExtractionKind::Insights => (
                "insights",
                "Discoveries or realizations about the system, process, or problem space",
            ),
            ExtractionKind::Learnings => (
                "learnings",
                "New skills, tools, or knowledge the author picked up",
            ),
        };

        PromptBuilder::new()
            .role("engineering manager", "reading weekly developer notes")
            .instructions(vec![
                &format!("Extract the {noun} described in the notes below"),
                guidance,
                "Keep each item to a single short sentence",
                "Return an empty array when there are none",
            ])
            .section("Notes", text)
            .output(r#"A JSON array of strings, e.g. ["Shipped the CSV exporter"]"#)
            .build()
    }

    /// Single comprehensive call replacing classify + summarize (optimized mode)
    pub fn comprehensive(activity_block: &str, range: &DateRange) -> String {
        let labels = Category::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("|");

        PromptBuilder::new()
            .role(
                "engineering manager",
                "turning a week of development activity into business-readable achievements",
            )
            .instructions(vec![
                "Read all development activity below",
                &format!(
                    "Produce {MIN_ACHIEVEMENTS} to {MAX_ACHIEVEMENTS} achievement entries covering the most meaningful work"
                ),
                "Each description must be one plain, business-readable sentence",
                "Assign each entry a category and an impact level",
            ])
            .section(&format!("Activity for {}", range.label()), activity_block)
            .output(&format!(
                "A JSON array of objects: [{{\"description\": string, \"category\": \"{labels}\", \"impact\": \"low|medium|high\"}}]"
            ))
            .build()
    }

    /// Rank the highest-impact activities
    pub fn highlights(descriptions: &[String]) -> String {
        PromptBuilder::new()
            .role("engineering manager", "picking the week's standout work")
            .instructions(vec![
                "Read the achievements below",
                "Pick the 1 to 3 with the highest business impact",
                "Return them verbatim, most impactful first",
            ])
            .section("Achievements", &numbered_list(descriptions))
            .output("A JSON array of 1-3 strings copied from the input")
            .build()
    }

    /// Render the summary into plain-text email prose
    pub fn email(summary: &WeeklySummary, range: &DateRange) -> String {
        let mut body = String::new();
        push_bucket(&mut body, "Features", &summary.features);
        push_bucket(&mut body, "Fixes", &summary.fixes);
        push_bucket(&mut body, "Improvements", &summary.refactors);
        if let Some(highlights) = &summary.highlights {
            push_bucket(&mut body, "Highlights", highlights);
        }

        PromptBuilder::new()
            .role(
                "technical writer",
                "drafting a weekly progress email for a non-technical audience",
            )
            .instructions(vec![
                "Write a short, friendly plain-text email summarizing the week",
                "Open with a one-line subject prefixed 'Subject: '",
                "Group the work naturally; do not invent work that is not listed",
                "Close with a single sign-off line",
            ])
            .section(&format!("Work for {}", range.label()), &body)
            .output("Plain text only: subject line, greeting, body, sign-off")
            .build()
    }
}

/// Which statement set an extraction prompt targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionKind {
    Achievements,
    Insights,
    Learnings,
}

fn numbered_list(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_bucket(out: &mut String, name: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("{name}:\n"));
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("release manager", "categorizing work")
            .instructions(vec!["Read", "Classify"])
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("release manager"));
        assert!(prompt.contains("1. Read"));
        assert!(prompt.contains("2. Classify"));
    }

    #[test]
    fn test_classify_prompt_lists_all_categories() {
        let prompt = DigestPrompts::classify("fix: null pointer");
        for cat in Category::ALL {
            assert!(prompt.contains(cat.as_str()), "missing {cat}");
        }
        assert!(prompt.contains("fix: null pointer"));
    }

    #[test]
    fn test_extract_prompt_varies_by_kind() {
        let achievements = DigestPrompts::extract(ExtractionKind::Achievements, "notes");
        let learnings = DigestPrompts::extract(ExtractionKind::Learnings, "notes");
        assert!(achievements.contains("achievements"));
        assert!(learnings.contains("learnings"));
        assert_ne!(achievements, learnings);
    }

    #[test]
    fn test_email_prompt_includes_buckets_and_range() {
        let summary = WeeklySummary {
            features: vec!["Add CSV export.".into()],
            fixes: vec!["Null pointer in parser.".into()],
            refactors: vec![],
            highlights: Some(vec!["Add CSV export.".into()]),
            notes: None,
        };
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 8, 17).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
        );
        let prompt = DigestPrompts::email(&summary, &range);
        assert!(prompt.contains("Add CSV export."));
        assert!(prompt.contains("Null pointer in parser."));
        assert!(prompt.contains("Aug 17 - Aug 23, 2026"));
        assert!(!prompt.contains("Improvements:"));
    }
}
