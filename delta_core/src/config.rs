use std::ffi::OsString;

use camino::Utf8PathBuf;
use config::{Config, Environment};
use delta_hosting::DEFAULT_API_URL;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::{glob, PatternList, RepositoryCoordinates, RevisionId};

/// Branch used for the base revision when no environment or branch is given.
pub const DEFAULT_BRANCH: &str = "main";

const PATTERN_SEPARATOR: char = '\n';

/// Where diffs and branch lookups are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Through the hosted repository API.
    Online,
    /// Against a local clone.
    #[default]
    Offline,
}

/// How the base revision is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseSelector {
    /// Latest successful deployment to an environment.
    Deployment {
        /// Environment name.
        environment: String,
    },
    /// Tip of a branch.
    Branch {
        /// Branch name without the `refs/heads/` prefix.
        name: String,
    },
}

/// Input validation failures. Each names the precondition that failed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Inputs could not be read.
    #[error("failed to read inputs: {source}")]
    Load {
        /// Loader error.
        #[from]
        source: config::ConfigError,
    },
    /// No repository coordinates were provided by the runner.
    #[error("repository is not set (GITHUB_REPOSITORY)")]
    MissingRepository,
    /// No current revision was provided by the runner.
    #[error("current commit is not set (GITHUB_SHA)")]
    MissingCurrentRevision,
    /// A token is required but absent.
    #[error("github_token must be specified when {reason}")]
    MissingToken {
        /// Why the token is required.
        reason: &'static str,
    },
    /// A user-supplied glob does not parse.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Offending pattern.
        pattern: String,
        /// Parser error.
        #[source]
        source: globset::Error,
    },
    /// The offline/online flags are not booleans or contradict each other.
    #[error("offline/online must be 'true' or 'false' and agree, got '{value}'")]
    InvalidMode {
        /// Raw input.
        value: String,
    },
    /// The output path depth is not a non-negative integer.
    #[error("delta_output_path_depth must be a non-negative integer, got '{value}'")]
    InvalidPathDepth {
        /// Raw input.
        value: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawInputs {
    input_environment: Option<String>,
    input_branch: Option<String>,
    input_github_token: Option<String>,
    input_offline: Option<String>,
    input_online: Option<String>,
    input_includes: Option<String>,
    input_excludes: Option<String>,
    input_commit: Option<String>,
    input_delta_output_path_depth: Option<String>,
    input_repository_path: Option<String>,
    github_repository: Option<String>,
    github_sha: Option<String>,
    github_api_url: Option<String>,
    github_output: Option<String>,
    github_workspace: Option<String>,
}

/// Validated-on-demand configuration for one delta run.
#[derive(Debug)]
pub struct DeltaConfig {
    /// Deployment environment whose last success is the base.
    pub environment: Option<String>,
    /// Branch whose tip is the base when no environment is set.
    pub branch: String,
    /// `owner/repo` path.
    pub repository: String,
    /// Revision being evaluated.
    pub current: RevisionId,
    /// Online or offline operation.
    pub mode: Mode,
    /// API token.
    pub token: Option<SecretString>,
    /// Include globs.
    pub includes: PatternList,
    /// Exclude globs.
    pub excludes: PatternList,
    /// Number of leading path segments to report; zero keeps full paths.
    pub path_depth: usize,
    /// Local clone used in offline mode.
    pub repository_path: Utf8PathBuf,
    /// Hosted API base URL.
    pub api_url: String,
    /// File that receives `key=value` outputs.
    pub output_path: Option<Utf8PathBuf>,
}

impl DeltaConfig {
    /// Configuration with defaults for everything but the mandatory fields.
    #[must_use]
    pub fn new(repository: impl Into<String>, current: impl Into<RevisionId>) -> Self {
        Self {
            environment: None,
            branch: DEFAULT_BRANCH.to_owned(),
            repository: repository.into(),
            current: current.into(),
            mode: Mode::Offline,
            token: None,
            includes: PatternList::new(),
            excludes: PatternList::new(),
            path_depth: 0,
            repository_path: Utf8PathBuf::from("."),
            api_url: DEFAULT_API_URL.to_owned(),
            output_path: None,
        }
    }

    /// Read inputs from the process environment. Variables whose name or
    /// value is not UTF-8 are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error when inputs cannot be read or are malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(utf8_vars(std::env::vars_os()))
    }

    /// Read inputs from `KEY=value` pairs named like runner variables
    /// (`INPUT_*`, `GITHUB_*`).
    ///
    /// # Errors
    ///
    /// Returns an error when inputs cannot be read or are malformed.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: config::Map<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        let raw: RawInputs = Config::builder()
            .add_source(Environment::default().source(Some(source)))
            .build()?
            .try_deserialize()?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawInputs) -> Result<Self, ConfigError> {
        let offline = non_empty(raw.input_offline);
        let online = non_empty(raw.input_online);
        let mode = match (parse_flag(offline.as_deref())?, parse_flag(online.as_deref())?) {
            (Some(offline_flag), Some(online_flag)) if offline_flag == online_flag => {
                return Err(ConfigError::InvalidMode {
                    value: format!(
                        "offline={}, online={}",
                        offline.unwrap_or_default(),
                        online.unwrap_or_default()
                    ),
                });
            }
            (Some(true), _) | (None, Some(false) | None) => Mode::Offline,
            (Some(false), _) | (None, Some(true)) => Mode::Online,
        };

        let path_depth = match non_empty(raw.input_delta_output_path_depth) {
            None => 0,
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPathDepth { value })?,
        };

        let current = non_empty(raw.input_commit)
            .or_else(|| non_empty(raw.github_sha))
            .unwrap_or_default();

        let repository_path = non_empty(raw.input_repository_path)
            .or_else(|| non_empty(raw.github_workspace))
            .unwrap_or_else(|| ".".to_owned());

        Ok(Self {
            environment: non_empty(raw.input_environment),
            branch: non_empty(raw.input_branch).unwrap_or_else(|| DEFAULT_BRANCH.to_owned()),
            repository: non_empty(raw.github_repository).unwrap_or_default(),
            current: RevisionId::new(current),
            mode,
            token: non_empty(raw.input_github_token).map(|token| SecretString::new(token.into())),
            includes: split_patterns(raw.input_includes.as_deref()),
            excludes: split_patterns(raw.input_excludes.as_deref()),
            path_depth,
            repository_path: Utf8PathBuf::from(repository_path),
            api_url: non_empty(raw.github_api_url).unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            output_path: non_empty(raw.github_output).map(Utf8PathBuf::from),
        })
    }

    /// Check every precondition of a run.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repository.is_empty() {
            return Err(ConfigError::MissingRepository);
        }
        if self.current.is_empty() {
            return Err(ConfigError::MissingCurrentRevision);
        }
        if self.token.is_none() {
            if self.environment.is_some() {
                return Err(ConfigError::MissingToken {
                    reason: "an environment is given",
                });
            }
            if self.mode == Mode::Online {
                return Err(ConfigError::MissingToken {
                    reason: "online mode is enabled",
                });
            }
        }
        for pattern in self.includes.iter().chain(&self.excludes) {
            if pattern.is_empty() {
                continue;
            }
            glob::compile(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Owner and name parsed from [`DeltaConfig::repository`].
    #[must_use]
    pub fn coordinates(&self) -> RepositoryCoordinates {
        RepositoryCoordinates::parse(&self.repository)
    }

    /// Base selection implied by the inputs.
    #[must_use]
    pub fn base_selector(&self) -> BaseSelector {
        self.environment.as_ref().map_or_else(
            || BaseSelector::Branch {
                name: self.branch.clone(),
            },
            |environment| BaseSelector::Deployment {
                environment: environment.clone(),
            },
        )
    }

    /// Whether any selected strategy talks to the hosted API.
    #[must_use]
    pub fn needs_hosting(&self) -> bool {
        self.mode == Mode::Online || self.environment.is_some()
    }
}

fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter().filter_map(|(key, value)| {
        match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                debug!(
                    variable = %key.unwrap_or_else(|raw| raw.to_string_lossy().into_owned()),
                    "skipping non-UTF-8 environment variable"
                );
                None
            }
        }
    })
}

fn parse_flag(value: Option<&str>) -> Result<Option<bool>, ConfigError> {
    match value {
        None => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(value) => Err(ConfigError::InvalidMode {
            value: value.to_owned(),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn split_patterns(raw: Option<&str>) -> PatternList {
    raw.unwrap_or_default()
        .split(PATTERN_SEPARATOR)
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .map(str::to_owned)
        .collect()
}
