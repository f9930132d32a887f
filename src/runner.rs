//! Batch validation of a catalog.
//!
//! Each discovered file is read, parsed and validated in its own task. A
//! failure on one file becomes a failing result for that file only; the
//! root being unusable is the single fatal error.

use crate::catalog::discover::{discover, skill_folder_name, Candidate};
use crate::catalog::parser::{parse_document, ParsedDocument};
use crate::config::RunOptions;
use crate::error::{DiscoveryError, ParseError};
use crate::rules::{DocumentKind, RuleId, ValidationResult};
use crate::validate::{check_assets, scan_assets, validate_agent, validate_skill};
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Why a single document could not be turned into front matter
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Read(#[from] DiscoveryError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl LoadError {
    pub fn rule_id(&self) -> RuleId {
        match self {
            LoadError::Read(_) => RuleId::Unreadable,
            LoadError::Parse(e) => RuleId::from(e),
        }
    }
}

/// Read a file, giving up after `timeout`
pub async fn read_document(path: &Path, timeout: Duration) -> Result<String, DiscoveryError> {
    with_timeout(path, timeout, tokio::fs::read_to_string(path)).await
}

/// Bound a read of `path` by `timeout`, mapping both failure modes to `DiscoveryError`
async fn with_timeout<F>(path: &Path, timeout: Duration, read: F) -> Result<String, DiscoveryError>
where
    F: Future<Output = std::io::Result<String>>,
{
    match tokio::time::timeout(timeout, read).await {
        Ok(Ok(content)) => Ok(content),
        Ok(Err(source)) => Err(DiscoveryError::Unreadable {
            path: path.to_path_buf(),
            source,
        }),
        Err(_) => Err(DiscoveryError::Timeout {
            path: path.to_path_buf(),
            timeout,
        }),
    }
}

/// Read and parse a document's front matter and body
pub async fn load_document(path: &Path, timeout: Duration) -> Result<ParsedDocument, LoadError> {
    let content = read_document(path, timeout).await?;
    Ok(parse_document(&content)?)
}

/// Validate a single discovered document
pub async fn validate_candidate(candidate: Candidate, opts: &RunOptions) -> ValidationResult {
    let Candidate { path, kind } = candidate;

    let doc = match load_document(&path, opts.read_timeout).await {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "load failed");
            let mut result = ValidationResult::new(path, kind);
            result.report(e.rule_id(), e.to_string());
            return result;
        }
    };

    match kind {
        DocumentKind::Agent => validate_agent(&path, &doc.front_matter),
        DocumentKind::Skill => {
            let folder = skill_folder_name(&path).unwrap_or_default();
            let mut result = validate_skill(&path, &doc.front_matter, folder);

            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let assets = tokio::task::spawn_blocking(move || scan_assets(&dir))
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "asset scan failed");
                    Vec::new()
                });
            check_assets(&mut result, &doc.body, &assets, opts.max_asset_bytes);
            result
        }
    }
}

/// Discover, parse and validate every document under `root`.
///
/// Results are ordered by path regardless of completion order.
pub async fn run(root: &Path, opts: &RunOptions) -> Result<Vec<ValidationResult>, DiscoveryError> {
    let candidates = discover(root, &opts.exclude)?;
    tracing::info!(root = %root.display(), files = candidates.len(), "validating catalog");

    let limit = Arc::new(Semaphore::new(opts.jobs.max(1)));
    let shared = Arc::new(opts.clone());
    let mut tasks = JoinSet::new();

    for candidate in candidates.iter().cloned() {
        let limit = Arc::clone(&limit);
        let opts = Arc::clone(&shared);
        tasks.spawn(async move {
            let _permit = limit.acquire_owned().await.ok();
            validate_candidate(candidate, &opts).await
        });
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => tracing::error!(error = %e, "validation task failed"),
        }
    }

    fill_missing(&candidates, &mut results);
    results.sort_by(|a, b| a.path.cmp(&b.path));

    let failed = results.iter().filter(|r| !r.passed()).count();
    tracing::info!(total = results.len(), failed, "validation finished");
    Ok(results)
}

/// Give every candidate without a result (its task panicked) a failing one
fn fill_missing(candidates: &[Candidate], results: &mut Vec<ValidationResult>) {
    let seen: HashSet<PathBuf> = results.iter().map(|r| r.path.clone()).collect();
    for candidate in candidates {
        if seen.contains(&candidate.path) {
            continue;
        }
        let mut result = ValidationResult::new(candidate.path.clone(), candidate.kind);
        result.report(RuleId::Unreadable, "validation of this file did not complete");
        results.push(result);
    }
}

/// Strip `root` from a result path for display
pub fn relative_path(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
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

    fn good_skill(name: &str) -> String {
        format!(
            "---\nname: {}\ndescription: 'Reusable knowledge about {}'\n---\n# {}\n",
            name, name, name
        )
    }

    fn good_agent() -> &'static str {
        "---\ndescription: 'Expert assistant'\ntools: ['read']\nmodel: sonnet\n---\nBody\n"
    }

    fn catalog() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for i in 0..5 {
            write(root, &format!("agents/agent-{}.agent.md", i), good_agent());
            let name = format!("skill-{}", i);
            write(root, &format!("skills/group/{}/SKILL.md", name), &good_skill(&name));
        }
        dir
    }

    #[tokio::test]
    async fn test_all_pass() {
        let dir = catalog();
        let results = run(dir.path(), &RunOptions::default()).await.unwrap();
        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|r| r.passed()), "{:?}", results);
        assert_eq!(
            results.iter().filter(|r| r.kind == DocumentKind::Skill).count(),
            5
        );
    }

    #[tokio::test]
    async fn test_fault_isolation() {
        let dir = catalog();
        // Replace one agent with a file lacking front matter
        write(dir.path(), "agents/agent-3.agent.md", "# No front matter here\n");

        let results = run(dir.path(), &RunOptions::default()).await.unwrap();
        assert_eq!(results.len(), 10);
        let failed: Vec<_> = results.iter().filter(|r| !r.passed()).collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].path.ends_with("agents/agent-3.agent.md"));
        assert_eq!(failed[0].violation_ids(), vec![RuleId::MissingBlock]);
    }

    #[tokio::test]
    async fn test_idempotent_and_sorted() {
        let dir = catalog();
        write(dir.path(), "skills/group/skill-2/SKILL.md", &good_skill("other-name"));
        write(dir.path(), "agents/Bad_Name.agent.md", "---\ndescription: nope\n---\n");

        let opts = RunOptions {
            jobs: 3,
            ..RunOptions::default()
        };
        let first = run(dir.path(), &opts).await.unwrap();
        let second = run(dir.path(), &opts).await.unwrap();
        assert_eq!(first, second);

        let paths: Vec<_> = first.iter().map(|r| r.path.clone()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[tokio::test]
    async fn test_malformed_and_unreadable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "agents/broken.agent.md", "---\ndescription: [oops\n---\n");
        let path = dir.path().join("agents/binary.agent.md");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let results = run(dir.path(), &RunOptions::default()).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].violation_ids(), vec![RuleId::Unreadable]);
        assert_eq!(results[1].violation_ids(), vec![RuleId::MalformedBlock]);
    }

    #[tokio::test]
    async fn test_read_timeout_maps_to_unreadable() {
        let path = Path::new("agents/stuck.agent.md");
        let stuck = std::future::pending::<std::io::Result<String>>();
        let err = with_timeout(path, Duration::from_millis(20), stuck)
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Timeout { .. }));

        let err = LoadError::from(err);
        assert_eq!(err.rule_id(), RuleId::Unreadable);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_read_within_timeout() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "agents/a.agent.md", good_agent());
        let content = read_document(&dir.path().join("agents/a.agent.md"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(content, good_agent());
    }

    #[test]
    fn test_fill_missing_keeps_one_result_per_file() {
        let candidates = vec![
            Candidate {
                path: PathBuf::from("agents/a.agent.md"),
                kind: DocumentKind::Agent,
            },
            Candidate {
                path: PathBuf::from("skills/s/SKILL.md"),
                kind: DocumentKind::Skill,
            },
        ];
        let mut results = vec![ValidationResult::new("agents/a.agent.md", DocumentKind::Agent)];
        fill_missing(&candidates, &mut results);

        assert_eq!(results.len(), 2);
        assert!(results[0].passed());
        assert_eq!(results[1].path, PathBuf::from("skills/s/SKILL.md"));
        assert_eq!(results[1].kind, DocumentKind::Skill);
        assert_eq!(results[1].violation_ids(), vec![RuleId::Unreadable]);
    }

    #[tokio::test]
    async fn test_skill_assets() {
        let dir = TempDir::new().unwrap();
        let body = "---\nname: my-skill\ndescription: 'Skill with bundled files'\n---\nSee references/guide.md\n";
        write(dir.path(), "skills/my-skill/SKILL.md", body);
        write(dir.path(), "skills/my-skill/references/guide.md", "guide");
        write(dir.path(), "skills/my-skill/big.bin", "0123456789");

        let opts = RunOptions {
            max_asset_bytes: 8,
            ..RunOptions::default()
        };
        let results = run(dir.path(), &opts).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].violation_ids(), vec![RuleId::AssetTooLarge]);
        assert_eq!(results[0].warning_ids(), vec![RuleId::UnreferencedAsset]);
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = run(&dir.path().join("missing"), &RunOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::RootNotFound(_)));
    }

    #[test]
    fn test_relative_path() {
        let root = Path::new("/catalog");
        assert_eq!(
            relative_path(root, Path::new("/catalog/agents/a.agent.md")),
            PathBuf::from("agents/a.agent.md")
        );
        assert_eq!(
            relative_path(root, Path::new("elsewhere/x.md")),
            PathBuf::from("elsewhere/x.md")
        );
    }
}
