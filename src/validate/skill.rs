//! Skill file rules.

use super::{require_description, require_single_quotes};
use crate::catalog::parser::{FieldValue, FrontMatter};
use crate::rules::{
    is_kebab_case, DocumentKind, RuleId, ValidationResult, MAX_DESCRIPTION_LEN,
    MIN_DESCRIPTION_LEN,
};
use std::path::Path;

/// Validate a skill's front matter against the folder that holds it.
///
/// Asset checks need the filesystem and are applied separately by
/// [`super::check_assets`].
pub fn validate_skill(path: &Path, fm: &FrontMatter, folder_name: &str) -> ValidationResult {
    let mut result = ValidationResult::new(path, DocumentKind::Skill);

    match fm.get("name").map(|f| &f.value) {
        None | Some(FieldValue::Null) => {
            result.report(RuleId::MissingName, "name is missing");
        }
        Some(FieldValue::Text(name)) if name.trim().is_empty() => {
            result.report(RuleId::MissingName, "name is empty");
        }
        Some(FieldValue::Text(name)) => {
            if !is_kebab_case(name) {
                result.report(
                    RuleId::BadNameFormat,
                    format!("name '{}' must be lowercase words separated by hyphens", name),
                );
            }
            if name != folder_name {
                result.report(
                    RuleId::NameFolderMismatch,
                    format!("name '{}' does not match folder '{}'", name, folder_name),
                );
            }
        }
        Some(_) => {
            result.report(RuleId::BadNameFormat, "name must be a single string");
        }
    }

    if let Some((desc, field)) = require_description(fm, &mut result) {
        let len = desc.chars().count();
        if len < MIN_DESCRIPTION_LEN {
            result.report(
                RuleId::DescriptionTooShort,
                format!(
                    "description is {} characters, minimum is {}",
                    len, MIN_DESCRIPTION_LEN
                ),
            );
        } else if len > MAX_DESCRIPTION_LEN {
            result.report(
                RuleId::DescriptionTooLong,
                format!(
                    "description is {} characters, maximum is {}",
                    len, MAX_DESCRIPTION_LEN
                ),
            );
        }
        require_single_quotes(field, &mut result);
    }

    if !is_kebab_case(folder_name) {
        result.report(
            RuleId::BadFolderName,
            format!(
                "folder '{}' must be lowercase words separated by hyphens",
                folder_name
            ),
        );
    }

    result
}
