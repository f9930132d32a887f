//! Files bundled alongside a SKILL.md.

use crate::rules::{RuleId, ValidationResult};
use std::path::Path;
use walkdir::WalkDir;

/// A non-SKILL.md file inside a skill folder
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Asset {
    /// Path relative to the skill folder, `/`-separated
    pub rel_path: String,
    pub size: u64,
}

impl Asset {
    fn file_name(&self) -> &str {
        self.rel_path.rsplit('/').next().unwrap_or(&self.rel_path)
    }
}

/// List the assets of the skill whose folder is `skill_dir`.
///
/// Hidden entries and nested folders that carry their own SKILL.md are
/// skipped. Entries that cannot be read are logged and left out.
pub fn scan_assets(skill_dir: &Path) -> Vec<Asset> {
    let mut assets = Vec::new();
    let walker = WalkDir::new(skill_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            let hidden = e.file_name().to_str().map(|s| s.starts_with('.')).unwrap_or(false);
            let nested_skill = e.file_type().is_dir() && e.path().join("SKILL.md").is_file();
            !hidden && !nested_skill
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable asset");
                continue;
            }
        };
        if !entry.file_type().is_file() || (entry.depth() == 1 && entry.file_name() == "SKILL.md") {
            continue;
        }
        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "cannot stat asset");
                continue;
            }
        };
        let Ok(rel) = entry.path().strip_prefix(skill_dir) else {
            continue;
        };
        let rel_path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        assets.push(Asset { rel_path, size });
    }

    assets.sort();
    assets
}

/// Whether `body` mentions `needle` as a whole path or file name, not as
/// the tail or head of a longer one
fn mentions(body: &str, needle: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '-';
    body.match_indices(needle).any(|(start, _)| {
        let before = body[..start].chars().next_back();
        let after = body[start + needle.len()..].chars().next();
        !before.is_some_and(|c| is_word(c) || c == '.') && !after.is_some_and(is_word)
    })
}

/// Apply the asset rules: oversized files fail, unreferenced ones warn
pub fn check_assets(
    result: &mut ValidationResult,
    body: &str,
    assets: &[Asset],
    max_bytes: u64,
) {
    for asset in assets {
        if asset.size > max_bytes {
            result.report(
                RuleId::AssetTooLarge,
                format!(
                    "{} is {} bytes, limit is {} bytes",
                    asset.rel_path, asset.size, max_bytes
                ),
            );
        }
        if !mentions(body, &asset.rel_path) && !mentions(body, asset.file_name()) {
            result.report(
                RuleId::UnreferencedAsset,
                format!("{} is not referenced from SKILL.md", asset.rel_path),
            );
        }
    }
}
