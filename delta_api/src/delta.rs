use serde::{Deserialize, Serialize};

/// Ordered file paths that differ between two revisions.
///
/// Order follows the provider and duplicates are kept.
pub type ChangeSet = Vec<String>;

/// Ordered glob patterns.
pub type PatternList = Vec<String>;

/// Outcome of a delta run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaResult {
    /// True iff `files` is non-empty.
    pub detected: bool,
    /// Filtered changed paths in provider order.
    #[serde(default)]
    pub files: ChangeSet,
}

impl DeltaResult {
    /// Build a result from filtered paths.
    #[must_use]
    pub fn from_files(files: ChangeSet) -> Self {
        Self {
            detected: !files.is_empty(),
            files,
        }
    }

    /// Paths cut down to their first `depth` segments, keeping only the first
    /// occurrence of each truncated path.
    ///
    /// A depth of zero returns the paths unchanged.
    #[must_use]
    pub fn truncated(&self, depth: usize) -> ChangeSet {
        if depth == 0 {
            return self.files.clone();
        }

        let mut seen = std::collections::HashSet::new();
        self.files
            .iter()
            .map(|path| {
                path.split('/')
                    .take(depth)
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }
}
