//! Catalog file discovery.

use crate::error::DiscoveryError;
use crate::rules::DocumentKind;
use glob::Pattern;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const AGENT_SUFFIX: &str = ".agent.md";
const SKILL_FILE: &str = "SKILL.md";
const SKILLS_DIR: &str = "skills";

/// A discovered catalog document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Candidate {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

/// Classify a path as an agent or skill document.
///
/// Agents are `*.agent.md` anywhere. Skills are `SKILL.md` files with an
/// ancestor directory named `skills`.
pub fn classify(path: &Path) -> Option<DocumentKind> {
    let name = path.file_name()?.to_str()?;

    if name.len() > AGENT_SUFFIX.len() && name.ends_with(AGENT_SUFFIX) {
        return Some(DocumentKind::Agent);
    }

    if name == SKILL_FILE {
        let in_skills = path
            .parent()?
            .ancestors()
            .any(|dir| dir.file_name() == Some(OsStr::new(SKILLS_DIR)));
        if in_skills {
            return Some(DocumentKind::Skill);
        }
    }

    None
}

/// File name of an agent without the `.agent.md` suffix
pub fn agent_stem(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()?.strip_suffix(AGENT_SUFFIX)
}

/// Name of the folder holding a skill's SKILL.md
pub fn skill_folder_name(path: &Path) -> Option<&str> {
    path.parent()?.file_name()?.to_str()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

fn is_excluded(root: &Path, path: &Path, exclude: &[Pattern]) -> bool {
    if exclude.is_empty() {
        return false;
    }
    let rel = path.strip_prefix(root).unwrap_or(path);
    exclude.iter().any(|p| p.matches_path(rel))
}

/// Check that the catalog root exists and is a readable directory
pub fn check_root(root: &Path) -> Result<(), DiscoveryError> {
    let meta = std::fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DiscoveryError::RootNotFound(root.to_path_buf()),
        _ => DiscoveryError::Unreadable {
            path: root.to_path_buf(),
            source: e,
        },
    })?;
    if !meta.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }
    std::fs::read_dir(root).map_err(|e| DiscoveryError::Unreadable {
        path: root.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Find every agent and skill document under `root`, sorted by path.
///
/// Files are classified by their path below `root`, so a `skills`
/// directory above the root does not make a `SKILL.md` a skill.
pub fn discover(root: &Path, exclude: &[Pattern]) -> Result<Vec<Candidate>, DiscoveryError> {
    check_root(root)?;

    let mut found = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden(e) && !is_excluded(root, e.path(), exclude));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if let Some(kind) = classify(rel) {
            tracing::debug!(path = %entry.path().display(), %kind, "discovered");
            found.push(Candidate {
                path: entry.into_path(),
                kind,
            });
        }
    }

    found.sort();
    Ok(found)
}
