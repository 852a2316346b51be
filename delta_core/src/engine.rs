use std::{fmt, sync::Arc};

use delta_hosting::GitHubClient;
use delta_hosting_api::HostingApi;
use tracing::{debug, info, warn};

use crate::{
    config::{BaseSelector, ConfigError, DeltaConfig, Mode},
    diff::{DiffStrategy, LocalDiff, RemoteDiff},
    glob::GlobFilter,
    revision::{BranchSource, BranchTip, LatestSuccessfulDeployment, RevisionStrategy},
    DeltaResult, Error, Result, RevisionId,
};

/// Base lookup, diff and filter wired together for one run.
pub struct DeltaEngine {
    revision: Box<dyn RevisionStrategy>,
    diff: Box<dyn DiffStrategy>,
    filter: GlobFilter,
}

impl DeltaEngine {
    /// Assemble an engine from explicit strategies.
    #[must_use]
    pub fn new(
        revision: Box<dyn RevisionStrategy>,
        diff: Box<dyn DiffStrategy>,
        filter: GlobFilter,
    ) -> Self {
        Self {
            revision,
            diff,
            filter,
        }
    }

    /// Select strategies from the configuration.
    ///
    /// `hosting` is required when the configuration is online or names an
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when a hosted backend is needed
    /// but none was supplied.
    pub fn from_config(
        config: &DeltaConfig,
        hosting: Option<Arc<dyn HostingApi>>,
    ) -> Result<Self> {
        if hosting.is_none() && config.needs_hosting() {
            return Err(ConfigError::MissingToken {
                reason: if config.environment.is_some() {
                    "an environment is given"
                } else {
                    "online mode is enabled"
                },
            }
            .into());
        }
        let repo = config.coordinates();

        let revision: Box<dyn RevisionStrategy> = match (config.base_selector(), &hosting) {
            (BaseSelector::Deployment { environment }, Some(hosting)) => Box::new(
                LatestSuccessfulDeployment::new(Arc::clone(hosting), repo.clone(), environment),
            ),
            (BaseSelector::Branch { name }, Some(hosting)) if config.mode == Mode::Online => {
                Box::new(BranchTip::new(
                    name,
                    BranchSource::Remote {
                        hosting: Arc::clone(hosting),
                        repo: repo.clone(),
                    },
                ))
            }
            (BaseSelector::Branch { name }, _) => Box::new(BranchTip::new(
                name,
                BranchSource::Local {
                    path: config.repository_path.clone(),
                },
            )),
            (BaseSelector::Deployment { .. }, None) => {
                return Err(ConfigError::MissingToken {
                    reason: "an environment is given",
                }
                .into());
            }
        };

        let diff: Box<dyn DiffStrategy> = match (config.mode, hosting) {
            (Mode::Online, Some(hosting)) => Box::new(RemoteDiff::new(hosting, repo)),
            _ => Box::new(LocalDiff::new(config.repository_path.clone())),
        };

        let filter = GlobFilter::new(&config.includes, &config.excludes);
        Ok(Self::new(revision, diff, filter))
    }

    /// Resolve the base, diff it against `current` and filter the result.
    ///
    /// # Errors
    ///
    /// Propagates failures from the base lookup or the diff.
    pub fn run(&self, current: &RevisionId) -> Result<DeltaResult> {
        let base = self.revision.resolve_base()?;
        info!(
            strategy = self.revision.name(),
            %base,
            %current,
            "resolved base revision"
        );
        if base.is_empty() {
            warn!("no base revision found");
        }

        let changes = self.diff.diff(&base, current)?;
        debug!(
            strategy = self.diff.name(),
            changes = changes.len(),
            "computed changed paths"
        );

        let files = self.filter.filter(&changes);
        let result = DeltaResult::from_files(files);
        info!(
            detected = result.detected,
            files = result.files.len(),
            "delta resolved"
        );
        Ok(result)
    }
}

impl fmt::Debug for DeltaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeltaEngine")
            .field("revision", &self.revision.name())
            .field("diff", &self.diff.name())
            .finish_non_exhaustive()
    }
}

/// Validate `config`, connect to the hosted API if needed and run.
///
/// # Errors
///
/// Returns configuration, git or hosting failures.
pub fn run(config: &DeltaConfig) -> Result<DeltaResult> {
    config.validate()?;

    let hosting: Option<Arc<dyn HostingApi>> = match (&config.token, config.needs_hosting()) {
        (Some(token), true) => {
            let client = GitHubClient::new(config.api_url.clone(), token).map_err(|source| {
                Error::Hosting {
                    operation: "create client",
                    source,
                }
            })?;
            Some(Arc::new(client))
        }
        _ => None,
    };

    DeltaEngine::from_config(config, hosting)?.run(&config.current)
}
