//! Text and JSON rendering of validation results.

use crate::rules::{Finding, ValidationResult};
use crate::runner::relative_path;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed()).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            warnings: results.iter().map(|r| r.warnings.len()).sum(),
        }
    }

    /// Whether the run should exit successfully
    pub fn is_success(&self, strict: bool) -> bool {
        self.failed == 0 && (!strict || self.warnings == 0)
    }
}

#[derive(Debug, Serialize)]
struct JsonResult<'a> {
    path: PathBuf,
    kind: &'static str,
    passed: bool,
    violations: &'a [Finding],
    warnings: &'a [Finding],
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    root: &'a Path,
    generated_at: DateTime<Utc>,
    summary: Summary,
    results: Vec<JsonResult<'a>>,
}

/// Render results for display
pub struct Report<'a> {
    root: &'a Path,
    results: &'a [ValidationResult],
    summary: Summary,
}

impl<'a> Report<'a> {
    pub fn new(root: &'a Path, results: &'a [ValidationResult]) -> Self {
        Self {
            root,
            results,
            summary: Summary::from_results(results),
        }
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn render(&self, format: ReportFormat, quiet: bool) -> anyhow::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text(quiet)),
            ReportFormat::Json => self.to_json(Utc::now()),
        }
    }

    /// One line per file, findings indented beneath it, summary last.
    /// With `quiet`, clean passing files are omitted.
    pub fn to_text(&self, quiet: bool) -> String {
        let mut out = String::new();
        for result in self.results {
            let clean = result.passed() && result.warnings.is_empty();
            if quiet && clean {
                continue;
            }
            let status = if result.passed() { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "{} {} {}",
                status,
                result.kind,
                relative_path(self.root, &result.path).display()
            );
            for f in &result.violations {
                let _ = writeln!(out, "  error[{}]: {}", f.rule, f.message);
            }
            for f in &result.warnings {
                let _ = writeln!(out, "  warning[{}]: {}", f.rule, f.message);
            }
        }

        let s = &self.summary;
        let _ = write!(
            out,
            "{} files checked: {} passed, {} failed, {} warnings",
            s.total, s.passed, s.failed, s.warnings
        );
        out
    }

    pub fn to_json(&self, generated_at: DateTime<Utc>) -> anyhow::Result<String> {
        let report = JsonReport {
            root: self.root,
            generated_at,
            summary: self.summary,
            results: self
                .results
                .iter()
                .map(|r| JsonResult {
                    path: relative_path(self.root, &r.path),
                    kind: r.kind.as_str(),
                    passed: r.passed(),
                    violations: &r.violations,
                    warnings: &r.warnings,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}
