use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque commit identifier (e.g., a git SHA).
///
/// An empty identifier means "not found" and is produced by base lookups that
/// failed recoverably. Identifiers are compared for equality only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    /// Wrap a commit identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The "not found" identifier.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier signals an absent revision.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RevisionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RevisionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Owner and name of a hosted repository.
///
/// The rightmost `/`-separated segment is always the repository name; every
/// segment before it, joined by `/`, is the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCoordinates {
    /// Owner or organization path (may itself contain `/`).
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepositoryCoordinates {
    /// Split an `owner/repo` style path.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once('/') {
            Some((owner, name)) => Self {
                owner: owner.to_owned(),
                name: name.to_owned(),
            },
            None => Self {
                owner: String::new(),
                name: path.to_owned(),
            },
        }
    }
}

impl fmt::Display for RepositoryCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.owner.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}/{}", self.owner, self.name)
        }
    }
}
