//! Delta-resolution engine for path-based CI change detection.
//!
//! The crate is layered around four responsibilities:
//! - base revision lookup (deployment history or branch tip)
//! - changed-path computation (local repository or hosted compare API)
//! - include/exclude glob filtering
//! - configuration loading and pipeline output

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

/// Action inputs and their validation.
pub mod config;
/// Changed-path strategies.
pub mod diff;
/// Orchestration of lookup, diff and filter.
pub mod engine;
/// Include/exclude glob filtering.
pub mod glob;
/// Pipeline output channel.
pub mod output;
/// Local git repository access.
pub mod repository;
/// Base revision strategies.
pub mod revision;

pub use config::{BaseSelector, ConfigError, DeltaConfig, Mode};
pub use delta_api::{ChangeSet, DeltaResult, PatternList, RepositoryCoordinates, RevisionId};
pub use engine::{run, DeltaEngine};

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the delta engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Underlying git operation failed.
    #[error("git error: {source}")]
    Git {
        /// Original libgit2 error.
        #[from]
        source: git2::Error,
    },
    /// Provided path does not correspond to a git repository.
    #[error("path does not reference a git repository: {path}")]
    NotARepository {
        /// Path that failed to resolve to a repository.
        path: String,
    },
    /// A revision could not be resolved to a commit.
    #[error("could not resolve revision '{revision}' to a commit: {source}")]
    UnresolvedRevision {
        /// Revision as supplied by the caller.
        revision: String,
        /// Lookup failure reported by libgit2.
        #[source]
        source: git2::Error,
    },
    /// A named reference does not exist in the local repository.
    #[error("could not find reference {name}: {source}")]
    MissingReference {
        /// Fully qualified reference name.
        name: String,
        /// Lookup failure reported by libgit2.
        #[source]
        source: git2::Error,
    },
    /// A hosted repository API call failed.
    #[error("{operation} failed: {source}")]
    Hosting {
        /// Operation being performed.
        operation: &'static str,
        /// Backend error.
        #[source]
        source: delta_hosting_api::HostingError,
    },
    /// Filesystem interaction failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Filesystem path involved in the failed operation.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
    /// Writing to the pipeline output channel failed.
    #[error("failed to write output to {path}: {source}")]
    Output {
        /// Output file path.
        path: String,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Result serialization failed.
    #[error("failed to serialize output: {source}")]
    Serialize {
        /// Original serde error.
        #[from]
        source: serde_json::Error,
    },
}
