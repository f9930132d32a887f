//! Agent file rules.

use super::{require_description, require_single_quotes};
use crate::catalog::discover::agent_stem;
use crate::catalog::parser::FrontMatter;
use crate::rules::{is_kebab_case, DocumentKind, RuleId, ValidationResult};
use std::path::Path;

/// Validate an agent document's front matter and file name
pub fn validate_agent(path: &Path, fm: &FrontMatter) -> ValidationResult {
    let mut result = ValidationResult::new(path, DocumentKind::Agent);

    if let Some((_, field)) = require_description(fm, &mut result) {
        require_single_quotes(field, &mut result);
    }

    let stem = agent_stem(path).unwrap_or_default();
    if !is_kebab_case(stem) {
        result.report(
            RuleId::BadFileName,
            format!(
                "file name '{}' must be lowercase words separated by hyphens",
                stem
            ),
        );
    }

    // Encouraged, not required
    if !fm.contains("tools") {
        result.report(RuleId::MissingTools, "no tools declared");
    }
    if !fm.contains("model") {
        result.report(RuleId::MissingModel, "no model declared");
    }

    result
}
