use globset::{GlobBuilder, GlobMatcher};
use tracing::warn;

use crate::ChangeSet;

/// Compile a single glob.
///
/// `*`, `?` and `[...]` never cross a `/`; `**` spans any number of whole
/// segments. Matching is case-sensitive.
///
/// # Errors
///
/// Returns the parser error for malformed patterns (e.g., an unclosed class).
pub fn compile(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// A pattern that failed to compile and is ignored during matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPattern {
    /// Pattern as supplied.
    pub pattern: String,
    /// Parser error message.
    pub reason: String,
}

/// Compiled list of globs with OR semantics.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    matchers: Vec<GlobMatcher>,
    rejected: Vec<RejectedPattern>,
    supplied: usize,
}

impl PatternSet {
    /// Compile `patterns`, ignoring empty entries.
    ///
    /// Malformed patterns are logged and recorded in [`PatternSet::rejected`];
    /// they never match anything.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut set = Self::default();
        for pattern in patterns.iter().map(AsRef::as_ref) {
            if pattern.is_empty() {
                continue;
            }
            set.supplied += 1;
            match compile(pattern) {
                Ok(matcher) => set.matchers.push(matcher),
                Err(err) => {
                    warn!(pattern, error = %err, "ignoring invalid glob pattern");
                    set.rejected.push(RejectedPattern {
                        pattern: pattern.to_owned(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        set
    }

    /// True when no non-empty pattern was supplied.
    ///
    /// A list whose every pattern was rejected is *not* empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.supplied == 0
    }

    /// Whether any compiled pattern matches `path`.
    #[must_use]
    pub fn matches_any(&self, path: &str) -> bool {
        self.matchers.iter().any(|matcher| matcher.is_match(path))
    }

    /// Patterns that failed to compile.
    #[must_use]
    pub fn rejected(&self) -> &[RejectedPattern] {
        &self.rejected
    }
}

/// Include/exclude filter applied to a change set.
///
/// Exclusion wins over inclusion. An empty include list includes everything;
/// an empty exclude list excludes nothing. Empty paths are always dropped.
#[derive(Debug, Clone, Default)]
pub struct GlobFilter {
    includes: PatternSet,
    excludes: PatternSet,
}

impl GlobFilter {
    /// Compile both pattern lists.
    pub fn new<I: AsRef<str>, E: AsRef<str>>(includes: &[I], excludes: &[E]) -> Self {
        Self {
            includes: PatternSet::compile(includes),
            excludes: PatternSet::compile(excludes),
        }
    }

    /// Whether `path` survives the filter.
    #[must_use]
    pub fn retains(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let included = self.includes.is_empty() || self.includes.matches_any(path);
        if !included {
            return false;
        }
        let excluded = !self.excludes.is_empty() && self.excludes.matches_any(path);
        !excluded
    }

    /// Retained candidates, in input order, as a new change set.
    #[must_use]
    pub fn filter(&self, candidates: &[String]) -> ChangeSet {
        candidates
            .iter()
            .filter(|path| self.retains(path))
            .cloned()
            .collect()
    }

    /// Rejected include patterns.
    #[must_use]
    pub fn rejected_includes(&self) -> &[RejectedPattern] {
        self.includes.rejected()
    }

    /// Rejected exclude patterns.
    #[must_use]
    pub fn rejected_excludes(&self) -> &[RejectedPattern] {
        self.excludes.rejected()
    }
}

/// One-shot helper around [`GlobFilter`].
#[must_use]
pub fn filter<I: AsRef<str>, E: AsRef<str>>(
    candidates: &[String],
    includes: &[I],
    excludes: &[E],
) -> ChangeSet {
    GlobFilter::new(includes, excludes).filter(candidates)
}
