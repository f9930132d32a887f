//! Front matter validator for agent and skill catalogs.
//!
//! ```ignore
//! use frontlint::{config::RunOptions, runner};
//!
//! let results = runner::run(Path::new("."), &RunOptions::default()).await?;
//! let failed = results.iter().filter(|r| !r.passed()).count();
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod report;
pub mod rules;
pub mod runner;
pub mod validate;

pub use error::{DiscoveryError, ParseError};
pub use rules::{DocumentKind, Finding, RuleId, ValidationResult};
pub use runner::run;
