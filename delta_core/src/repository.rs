//! Local repository access built on top of libgit2.

use std::fmt;
use std::path::{Path, PathBuf};

use git2::{Delta, DiffDelta, DiffFindOptions, ErrorClass, ErrorCode, Oid, Repository as GitRepository};
use tracing::debug;

use crate::{ChangeSet, Error, Result, RevisionId};

/// Handle to an on-disk repository.
pub struct Repository {
    inner: GitRepository,
    root: PathBuf,
}

impl Repository {
    /// Open the repository rooted at `path`. Parent directories are not
    /// searched.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized or is not the
    /// root of a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let original = path.as_ref();
        let canonical = std::fs::canonicalize(original).map_err(|source| Error::Io {
            path: display_path(original),
            source,
        })?;

        let repo = match GitRepository::open(&canonical) {
            Ok(repo) => repo,
            Err(err)
                if err.class() == ErrorClass::Repository && err.code() == ErrorCode::NotFound =>
            {
                return Err(Error::NotARepository {
                    path: display_path(&canonical),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };

        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();

        Ok(Self { inner: repo, root })
    }

    /// Returns the repository root (the git directory for bare repositories).
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up the commit named by a full hash.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedRevision`] when the identifier is malformed
    /// or no such commit exists.
    pub fn commit(&self, revision: &RevisionId) -> Result<git2::Commit<'_>> {
        Oid::from_str(revision.as_str())
            .and_then(|oid| self.inner.find_commit(oid))
            .map_err(|source| Error::UnresolvedRevision {
                revision: revision.to_string(),
                source,
            })
    }

    /// Paths that differ between the trees of `base` and `head`.
    ///
    /// Each entry is the post-change path, in tree-diff order. Pure deletions
    /// have no post-change path and are reported as empty strings.
    ///
    /// # Errors
    ///
    /// Returns an error when either revision cannot be resolved to a tree or
    /// the tree diff fails.
    pub fn changed_paths(&self, base: &RevisionId, head: &RevisionId) -> Result<ChangeSet> {
        let base_tree = self.commit(base)?.tree()?;
        let head_tree = self.commit(head)?.tree()?;

        let mut diff = self
            .inner
            .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)?;
        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find))?;

        let paths: ChangeSet = diff.deltas().map(|delta| post_change_path(&delta)).collect();
        debug!(%base, %head, changes = paths.len(), "computed tree diff");
        Ok(paths)
    }

    /// Commit at the tip of a local branch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingReference`] when `refs/heads/<branch>` does not
    /// exist, or a git error when it does not point at a commit.
    pub fn branch_tip(&self, branch: &str) -> Result<RevisionId> {
        let name = format!("refs/heads/{branch}");
        let reference = self
            .inner
            .find_reference(&name)
            .map_err(|source| Error::MissingReference {
                name: name.clone(),
                source,
            })?;
        let commit = reference.peel_to_commit()?;
        Ok(RevisionId::new(commit.id().to_string()))
    }
}

fn post_change_path(delta: &DiffDelta<'_>) -> String {
    if delta.status() == Delta::Deleted {
        return String::new();
    }
    delta
        .new_file()
        .path()
        .map(display_path)
        .unwrap_or_default()
}

fn display_path(path: &Path) -> String {
    path.to_path_buf()
        .into_os_string()
        .to_string_lossy()
        .into_owned()
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
