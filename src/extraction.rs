//! Medication extraction from free-text model output
//!
//! The recommendation prompt asks the model for a section like:
//!
//! ```text
//! RECOMMENDED MEDICATIONS:
//! - Sumatriptan: for migraine
//! - Acetaminophen: for pain
//!
//! USAGE GUIDELINES:
//! ...
//! ```
//!
//! Parsing is line based and never fails. Output the model did not format
//! as asked simply yields fewer (or no) mentions.

use crate::prompts::RECOMMENDED_MEDICATIONS_HEADER;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Names this long or longer are runaway bullets, not medication names
pub const MAX_NAME_LENGTH: usize = 50;

/// Bullet text that is filler rather than a medication
pub const DEFAULT_PLACEHOLDERS: &[&str] = &["no specific recommendations", "no known allergies"];

/// A medication named in model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationMention {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MedicationMention {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Extract bulleted medication names from the `RECOMMENDED MEDICATIONS:` section.
///
/// The header is matched case-insensitively anywhere in a line. While inside
/// the section, every line starting with `-` is split on its first `:`; the
/// left side (bullets and whitespace stripped) is the name, the right side the
/// description. Names that are empty or at least [`MAX_NAME_LENGTH`]
/// characters are dropped.
///
/// The section ends at the first blank line. This is a heuristic: a model that
/// runs straight into the next header without a blank line keeps the section
/// open, but only `-` lines are read, so header lines are ignored. A later
/// header re-opens the section.
///
/// Order is preserved and duplicates are kept; see [`dedupe`].
pub fn extract_medications(response_text: &str) -> Vec<MedicationMention> {
    let header = RECOMMENDED_MEDICATIONS_HEADER.to_uppercase();
    let mut mentions = Vec::new();
    let mut in_section = false;

    for line in response_text.lines() {
        let line = line.trim();

        if line.to_uppercase().contains(&header) {
            in_section = true;
            continue;
        }
        if line.is_empty() {
            in_section = false;
            continue;
        }
        if in_section && line.starts_with('-') {
            if let Some(mention) = parse_bullet(line) {
                mentions.push(mention);
            }
        }
    }

    tracing::debug!(count = mentions.len(), "Extracted medication mentions");
    mentions
}

fn parse_bullet(line: &str) -> Option<MedicationMention> {
    let (head, tail) = match line.split_once(':') {
        Some((head, tail)) => (head, Some(tail)),
        None => (line, None),
    };

    let name = head
        .trim()
        .trim_start_matches(|c: char| c == '-' || c == '*' || c.is_whitespace())
        .trim_end_matches('*')
        .trim();
    if name.is_empty() || name.chars().count() >= MAX_NAME_LENGTH {
        return None;
    }

    let description = tail
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Some(MedicationMention {
        name: name.to_string(),
        description,
    })
}

/// Drop placeholder phrases and case-insensitive repeats, keeping first occurrences
pub fn dedupe(mentions: Vec<MedicationMention>, placeholders: &[&str]) -> Vec<MedicationMention> {
    let mut seen = HashSet::new();
    mentions
        .into_iter()
        .filter(|mention| {
            let key = mention.name.to_lowercase();
            if placeholders.iter().any(|p| p.eq_ignore_ascii_case(&key)) {
                return false;
            }
            seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod proptests;
