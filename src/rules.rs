//! Rule table and validation result types.
//!
//! Every check the validator performs has an entry in [`RULES`]. The entry
//! fixes the rule's severity, so a finding is a violation or a warning
//! purely by its id.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::error::ParseError;

/// Minimum skill description length, in characters
pub const MIN_DESCRIPTION_LEN: usize = 10;
/// Maximum skill description length, in characters
pub const MAX_DESCRIPTION_LEN: usize = 1024;
/// Default size limit for files bundled with a skill (5 MiB)
pub const DEFAULT_MAX_ASSET_BYTES: u64 = 5 * 1024 * 1024;

static KEBAB_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid kebab-case regex"));

/// Lowercase words separated by single hyphens.
pub fn is_kebab_case(s: &str) -> bool {
    KEBAB_CASE.is_match(s)
}

/// Kind of catalog document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Agent,
    Skill,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Skill => "skill",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Violation,
    Warning,
}

/// Identifier of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RuleId {
    Unreadable,
    MissingBlock,
    MalformedBlock,
    MissingDescription,
    UnquotedDescription,
    BadFileName,
    MissingTools,
    MissingModel,
    MissingName,
    BadNameFormat,
    NameFolderMismatch,
    DescriptionTooShort,
    DescriptionTooLong,
    BadFolderName,
    UnreferencedAsset,
    AssetTooLarge,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        self.rule().name
    }

    pub fn severity(&self) -> Severity {
        self.rule().severity
    }

    fn rule(&self) -> &'static Rule {
        RULES
            .iter()
            .find(|r| r.id == *self)
            .unwrap_or(&RULES[0])
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ParseError> for RuleId {
    fn from(err: &ParseError) -> Self {
        match err {
            ParseError::MissingBlock => RuleId::MissingBlock,
            ParseError::MalformedBlock(_) => RuleId::MalformedBlock,
        }
    }
}

/// Rule table entry
pub struct Rule {
    pub id: RuleId,
    pub name: &'static str,
    pub severity: Severity,
    /// Which document kinds the rule applies to; empty means all
    pub applies_to: &'static [DocumentKind],
    pub summary: &'static str,
}

const ANY: &[DocumentKind] = &[];
const AGENT: &[DocumentKind] = &[DocumentKind::Agent];
const SKILL: &[DocumentKind] = &[DocumentKind::Skill];
const BOTH: &[DocumentKind] = &[DocumentKind::Agent, DocumentKind::Skill];

pub const RULES: &[Rule] = &[
    Rule {
        id: RuleId::Unreadable,
        name: "Unreadable",
        severity: Severity::Violation,
        applies_to: ANY,
        summary: "File could not be read (I/O error or read timeout)",
    },
    Rule {
        id: RuleId::MissingBlock,
        name: "MissingBlock",
        severity: Severity::Violation,
        applies_to: ANY,
        summary: "File must start with a --- delimited front matter block",
    },
    Rule {
        id: RuleId::MalformedBlock,
        name: "MalformedBlock",
        severity: Severity::Violation,
        applies_to: ANY,
        summary: "Front matter must be a YAML key-value mapping",
    },
    Rule {
        id: RuleId::MissingDescription,
        name: "MissingDescription",
        severity: Severity::Violation,
        applies_to: BOTH,
        summary: "description is required and must not be empty",
    },
    Rule {
        id: RuleId::UnquotedDescription,
        name: "UnquotedDescription",
        severity: Severity::Violation,
        applies_to: BOTH,
        summary: "description must be wrapped in single quotes",
    },
    Rule {
        id: RuleId::BadFileName,
        name: "BadFileName",
        severity: Severity::Violation,
        applies_to: AGENT,
        summary: "Agent file name must be lowercase words separated by hyphens",
    },
    Rule {
        id: RuleId::MissingTools,
        name: "MissingTools",
        severity: Severity::Warning,
        applies_to: AGENT,
        summary: "Agents are encouraged to declare their tools",
    },
    Rule {
        id: RuleId::MissingModel,
        name: "MissingModel",
        severity: Severity::Warning,
        applies_to: AGENT,
        summary: "Agents are encouraged to declare a model",
    },
    Rule {
        id: RuleId::MissingName,
        name: "MissingName",
        severity: Severity::Violation,
        applies_to: SKILL,
        summary: "name is required",
    },
    Rule {
        id: RuleId::BadNameFormat,
        name: "BadNameFormat",
        severity: Severity::Violation,
        applies_to: SKILL,
        summary: "name must be lowercase words separated by hyphens",
    },
    Rule {
        id: RuleId::NameFolderMismatch,
        name: "NameFolderMismatch",
        severity: Severity::Violation,
        applies_to: SKILL,
        summary: "name must equal the enclosing folder's name",
    },
    Rule {
        id: RuleId::DescriptionTooShort,
        name: "DescriptionTooShort",
        severity: Severity::Violation,
        applies_to: SKILL,
        summary: "description must be at least 10 characters",
    },
    Rule {
        id: RuleId::DescriptionTooLong,
        name: "DescriptionTooLong",
        severity: Severity::Violation,
        applies_to: SKILL,
        summary: "description must be at most 1024 characters",
    },
    Rule {
        id: RuleId::BadFolderName,
        name: "BadFolderName",
        severity: Severity::Violation,
        applies_to: SKILL,
        summary: "Skill folder name must be lowercase words separated by hyphens",
    },
    Rule {
        id: RuleId::UnreferencedAsset,
        name: "UnreferencedAsset",
        severity: Severity::Warning,
        applies_to: SKILL,
        summary: "Bundled file is not referenced from the skill body",
    },
    Rule {
        id: RuleId::AssetTooLarge,
        name: "AssetTooLarge",
        severity: Severity::Violation,
        applies_to: SKILL,
        summary: "Bundled file exceeds the asset size limit",
    },
];

/// A rule that fired, with a message specific to the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: RuleId,
    pub message: String,
}

/// Outcome of validating one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub violations: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationResult {
    pub fn new(path: impl Into<PathBuf>, kind: DocumentKind) -> Self {
        Self {
            path: path.into(),
            kind,
            violations: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a finding; the rule's severity decides which list it lands in
    pub fn report(&mut self, rule: RuleId, message: impl Into<String>) {
        let finding = Finding {
            rule,
            message: message.into(),
        };
        match rule.severity() {
            Severity::Violation => self.violations.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Rule ids of all violations, in the order they were reported
    pub fn violation_ids(&self) -> Vec<RuleId> {
        self.violations.iter().map(|f| f.rule).collect()
    }

    pub fn warning_ids(&self) -> Vec<RuleId> {
        self.warnings.iter().map(|f| f.rule).collect()
    }
}
