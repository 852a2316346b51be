use std::sync::Arc;

use camino::Utf8PathBuf;
use delta_hosting_api::HostingApi;
use tracing::debug;

use crate::{repository::Repository, ChangeSet, Error, RepositoryCoordinates, Result, RevisionId};

/// Computes the paths that differ between two revisions.
///
/// Implementations preserve backend ordering and never deduplicate.
pub trait DiffStrategy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Changed paths between `base` and `current`.
    ///
    /// # Errors
    ///
    /// Fails when either revision cannot be resolved or the backend fails.
    fn diff(&self, base: &RevisionId, current: &RevisionId) -> Result<ChangeSet>;
}

/// Tree diff against a repository on local disk.
#[derive(Debug, Clone)]
pub struct LocalDiff {
    path: Utf8PathBuf,
}

impl LocalDiff {
    /// Diff the repository found at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DiffStrategy for LocalDiff {
    fn name(&self) -> &'static str {
        "local"
    }

    fn diff(&self, base: &RevisionId, current: &RevisionId) -> Result<ChangeSet> {
        let repository = Repository::open(&self.path)?;
        repository.changed_paths(base, current)
    }
}

/// Commit comparison through the hosted repository API.
pub struct RemoteDiff {
    hosting: Arc<dyn HostingApi>,
    repo: RepositoryCoordinates,
}

impl RemoteDiff {
    /// Compare commits of `repo` through `hosting`.
    #[must_use]
    pub fn new(hosting: Arc<dyn HostingApi>, repo: RepositoryCoordinates) -> Self {
        Self { hosting, repo }
    }
}

impl DiffStrategy for RemoteDiff {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn diff(&self, base: &RevisionId, current: &RevisionId) -> Result<ChangeSet> {
        let comparison = self
            .hosting
            .compare_commits(&self.repo, base, current)
            .map_err(|source| Error::Hosting {
                operation: "compare commits",
                source,
            })?;
        debug!(
            backend = self.hosting.id(),
            files = comparison.files.len(),
            "compared commits"
        );
        Ok(comparison.filenames())
    }
}

impl std::fmt::Debug for RemoteDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDiff")
            .field("backend", &self.hosting.id())
            .field("repo", &self.repo)
            .finish()
    }
}
