//! Per-kind rule application.
//!
//! Validators are pure: they see a path, the parsed front matter and
//! whatever naming context the kind needs, and return a [`ValidationResult`].
//! [`assets::scan_assets`] is the one filesystem helper here; the runner
//! calls it on the blocking pool and feeds the list to [`check_assets`].

pub mod agent;
pub mod assets;
pub mod skill;

pub use agent::validate_agent;
pub use assets::{check_assets, scan_assets, Asset};
pub use skill::validate_skill;

use crate::catalog::parser::{Field, FieldValue, FrontMatter};
use crate::rules::{RuleId, ValidationResult};

/// Non-empty `description` text and its field, or a `MissingDescription` finding
fn require_description<'a>(
    fm: &'a FrontMatter,
    result: &mut ValidationResult,
) -> Option<(&'a str, &'a Field)> {
    let Some(field) = fm.get("description") else {
        result.report(RuleId::MissingDescription, "description is missing");
        return None;
    };

    match &field.value {
        FieldValue::Text(s) if !s.trim().is_empty() => Some((s.as_str(), field)),
        FieldValue::Text(_) | FieldValue::Null => {
            result.report(RuleId::MissingDescription, "description is empty");
            None
        }
        FieldValue::List(_) | FieldValue::Other => {
            result.report(
                RuleId::MissingDescription,
                "description must be a single string",
            );
            None
        }
    }
}

fn require_single_quotes(field: &Field, result: &mut ValidationResult) {
    if !field.is_single_quoted() {
        result.report(
            RuleId::UnquotedDescription,
            format!(
                "description must be wrapped in single quotes, found: {}",
                preview(&field.raw)
            ),
        );
    }
}

/// First few characters of a raw value for messages
fn preview(raw: &str) -> String {
    const MAX: usize = 40;
    if raw.chars().count() <= MAX {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
