//! Error types for catalog discovery and front matter parsing.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to reach or read part of the catalog.
///
/// At the root this aborts the run. For a single file it is downgraded to an
/// `Unreadable` finding on that file's result.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out reading {} after {}ms", .path.display(), .timeout.as_millis())]
    Timeout { path: PathBuf, timeout: Duration },
}

/// Failure to extract a front matter block from a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no --- delimited front matter block at the start of the file")]
    MissingBlock,

    #[error("front matter is not a key-value mapping: {0}")]
    MalformedBlock(String),
}
