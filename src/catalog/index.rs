//! Catalog listing of agents and skills.

use super::discover::{agent_stem, discover, Candidate};
use super::parser::FieldValue;
use crate::config::RunOptions;
use crate::error::DiscoveryError;
use crate::rules::DocumentKind;
use crate::runner::{load_document, relative_path};
use std::path::{Path, PathBuf};

/// One listed document
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub kind: DocumentKind,
    pub name: String,
    pub description: String,
    pub tools: Vec<String>,
    /// Path relative to the catalog root
    pub path: PathBuf,
}

/// Index of all discovered documents
#[derive(Debug, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    load_errors: Vec<(PathBuf, String)>,
}

impl CatalogIndex {
    /// Build index from a catalog root
    pub async fn build(root: &Path, opts: &RunOptions) -> Result<Self, DiscoveryError> {
        let mut index = CatalogIndex::default();

        for Candidate { path, kind } in discover(root, &opts.exclude)? {
            let rel = relative_path(root, &path);
            match load_document(&path, opts.read_timeout).await {
                Ok(doc) => {
                    let fm = &doc.front_matter;
                    let name = fm
                        .text("name")
                        .or_else(|| match kind {
                            DocumentKind::Agent => agent_stem(&path),
                            DocumentKind::Skill => None,
                        })
                        .unwrap_or_default()
                        .to_string();
                    let tools = match fm.get("tools").map(|f| &f.value) {
                        Some(FieldValue::List(tools)) => tools.clone(),
                        _ => Vec::new(),
                    };
                    index.entries.push(CatalogEntry {
                        kind,
                        name,
                        description: fm.text("description").unwrap_or_default().to_string(),
                        tools,
                        path: rel,
                    });
                }
                Err(e) => index.load_errors.push((rel, e.to_string())),
            }
        }

        Ok(index)
    }

    pub fn all(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn of_kind(&self, kind: DocumentKind) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Get entry by declared name
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn errors(&self) -> &[(PathBuf, String)] {
        &self.load_errors
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Format the listing, grouped by kind, truncated after `max_entries` per kind
    pub fn format_listing(&self, max_entries: usize) -> String {
        if self.entries.is_empty() && self.load_errors.is_empty() {
            return "No agents or skills found.".to_string();
        }

        let mut lines = Vec::new();
        for (kind, heading) in [(DocumentKind::Agent, "Agents"), (DocumentKind::Skill, "Skills")] {
            let entries: Vec<_> = self.of_kind(kind).collect();
            if entries.is_empty() {
                continue;
            }
            lines.push(format!("{} ({}):", heading, entries.len()));
            for (count, entry) in entries.iter().enumerate() {
                if count >= max_entries {
                    lines.push(format!("  (+{} more)", entries.len() - max_entries));
                    break;
                }
                lines.push(format!("- {}: {}", entry.name, entry.description));
            }
        }

        if !self.load_errors.is_empty() {
            lines.push(format!("Unloadable ({}):", self.load_errors.len()));
            for (path, err) in &self.load_errors {
                lines.push(format!("- {}: {}", path.display(), err));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_build_index() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "agents/drupal-cache-expert.agent.md",
            "---\ndescription: 'Cache expert'\ntools: ['read', 'search']\n---\n",
        );
        write(
            root,
            "skills/drupal-cache-tags/SKILL.md",
            "---\nname: drupal-cache-tags\ndescription: 'Cache tag patterns'\n---\n",
        );
        write(root, "skills/broken/SKILL.md", "no front matter");

        let index = CatalogIndex::build(root, &RunOptions::default()).await.unwrap();
        assert_eq!(index.count(), 2);
        assert_eq!(index.all().filter(|e| e.kind == DocumentKind::Skill).count(), 1);
        assert_eq!(index.errors().len(), 1);
        assert_eq!(index.errors()[0].0, PathBuf::from("skills/broken/SKILL.md"));

        let agent = index.get("drupal-cache-expert").unwrap();
        assert_eq!(agent.kind, DocumentKind::Agent);
        assert_eq!(agent.tools, vec!["read", "search"]);

        let skill = index.get("drupal-cache-tags").unwrap();
        assert_eq!(skill.description, "Cache tag patterns");
        assert_eq!(skill.path, PathBuf::from("skills/drupal-cache-tags/SKILL.md"));
    }

    #[test]
    fn test_format_listing_truncates() {
        let entry = |name: &str| CatalogEntry {
            kind: DocumentKind::Skill,
            name: name.to_string(),
            description: format!("about {}", name),
            tools: Vec::new(),
            path: PathBuf::from(format!("skills/{}/SKILL.md", name)),
        };
        let index = CatalogIndex {
            entries: vec![entry("a"), entry("b"), entry("c")],
            load_errors: Vec::new(),
        };
        let listing = index.format_listing(2);
        assert_eq!(listing, "Skills (3):\n- a: about a\n- b: about b\n  (+1 more)");
    }

    #[test]
    fn test_format_empty() {
        let index = CatalogIndex::default();
        assert_eq!(index.format_listing(10), "No agents or skills found.");
    }
}
