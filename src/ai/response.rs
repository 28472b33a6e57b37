//! Model Response Parsing
//!
//! Every generation response is untrusted text. Parsing never throws:
//! the tagged [`ModelJson`] result carries either the parsed value or the
//! raw text, and each pipeline stage decides its own fallback for the
//! malformed case.
//!
//! Handles common model output issues:
//! - Markdown code fence wrapping (```json ... ```)
//! - JSON embedded in explanatory prose
//! - Trailing commas
//! - BOM and surrounding whitespace

use serde_json::Value;
use tracing::debug;

// =============================================================================
// Tagged Parse Result
// =============================================================================

/// Outcome of parsing one model response as JSON.
///
/// `Malformed` keeps the raw text so fallbacks can still mine it.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelJson {
    Parsed(Value),
    Malformed(String),
}

impl ModelJson {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Malformed(_) => None,
        }
    }
}

/// Parse a model response into tagged JSON, attempting extraction and
/// light repair before giving up.
pub fn parse_model_json(raw: &str) -> ModelJson {
    let cleaned = preprocess(raw);

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return ModelJson::Parsed(value);
    }

    // Light repair: trailing commas before closing brackets
    let repaired = fix_trailing_commas(&cleaned);
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        debug!("model JSON parsed after trailing-comma repair");
        return ModelJson::Parsed(value);
    }

    // Last resort: locate the first balanced JSON object or array inside
    // surrounding prose.
    if let Some(extracted) = extract_balanced_json(&cleaned)
        && let Ok(value) = serde_json::from_str::<Value>(&fix_trailing_commas(&extracted))
    {
        debug!("model JSON extracted from mixed content");
        return ModelJson::Parsed(value);
    }

    ModelJson::Malformed(raw.to_string())
}

/// Parse a model response expected to be a JSON array of strings.
/// Non-string elements are skipped; entries are trimmed and empties dropped.
pub fn parse_string_array(raw: &str) -> Option<Vec<String>> {
    match parse_model_json(raw) {
        ModelJson::Parsed(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => {
                        let trimmed = s.trim().to_string();
                        (!trimmed.is_empty()).then_some(trimmed)
                    }
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Normalize a model response expected to be a single short label:
/// first non-empty line, stripped of quotes, markup, and punctuation.
pub fn parse_label(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.' || c == '*')
        .trim()
        .to_string()
}

// =============================================================================
// Preprocessing
// =============================================================================

fn preprocess(raw: &str) -> String {
    let mut s = raw.trim();
    s = s.trim_start_matches('\u{feff}');
    strip_code_fences(s).trim().to_string()
}

fn strip_code_fences(s: &str) -> String {
    let mut result = s.to_string();

    if result.starts_with("```")
        && let Some(first_newline) = result.find('\n')
    {
        result = result[first_newline + 1..].to_string();
    }

    if result.ends_with("```") {
        result = result[..result.len() - 3].trim_end().to_string();
    }

    result
}

fn fix_trailing_commas(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                result.push(c);
            }
            ',' => {
                // Drop the comma if the next non-whitespace char closes a scope
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some(']') | Some('}')) {
                    result.push(c);
                }
            }
            _ => result.push(c),
        }
    }

    result
}

/// Find the first balanced `{...}` or `[...]` region, string-aware
fn extract_balanced_json(s: &str) -> Option<String> {
    let start = s.find(['{', '['])?;
    let bytes: Vec<char> = s[start..].chars().collect();
    let open = bytes[0];
    let close = if open == '{' { '}' } else { ']' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(bytes[..=i].iter().collect());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_clean_json() {
        let result = parse_model_json(r#"{"category": "fix"}"#);
        assert_eq!(result, ModelJson::Parsed(json!({"category": "fix"})));
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n[\"shipped exports\", \"fixed auth\"]\n```";
        let result = parse_model_json(raw);
        assert_eq!(
            result,
            ModelJson::Parsed(json!(["shipped exports", "fixed auth"]))
        );
    }

    #[test]
    fn test_parse_json_in_prose() {
        let raw = "Here are the achievements you asked for:\n[\"one\", \"two\"]\nHope that helps!";
        assert_eq!(parse_model_json(raw), ModelJson::Parsed(json!(["one", "two"])));
    }

    #[test]
    fn test_parse_trailing_comma() {
        let raw = r#"{"items": ["a", "b",], }"#;
        assert!(parse_model_json(raw).is_parsed());
    }

    #[test]
    fn test_malformed_keeps_raw() {
        let raw = "I could not produce JSON today.";
        assert_eq!(parse_model_json(raw), ModelJson::Malformed(raw.to_string()));
    }

    #[test]
    fn test_brackets_inside_strings_are_ignored() {
        let raw = r#"note: ["contains ] bracket", "ok"]"#;
        assert_eq!(
            parse_model_json(raw),
            ModelJson::Parsed(json!(["contains ] bracket", "ok"]))
        );
    }

    #[test]
    fn test_parse_string_array() {
        assert_eq!(
            parse_string_array(r#"["a", "  b ", "", 3, "c"]"#),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(parse_string_array(r#"{"not": "an array"}"#), None);
        assert_eq!(parse_string_array("garbage"), None);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("  feature  \nextra explanation"), "feature");
        assert_eq!(parse_label("\"fix\"."), "fix");
        assert_eq!(parse_label("`refactor`"), "refactor");
        assert_eq!(parse_label(""), "");
    }
}
