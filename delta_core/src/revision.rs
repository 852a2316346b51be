use std::sync::Arc;

use camino::Utf8PathBuf;
use delta_hosting_api::{HostingApi, DEPLOYMENTS_PAGE_SIZE};
use tracing::{debug, info, warn};

use crate::{repository::Repository, Error, RepositoryCoordinates, Result, RevisionId};

/// Determines the base revision to diff against.
pub trait RevisionStrategy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolve the base revision.
    ///
    /// An empty [`RevisionId`] means no base was found and is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the lookup has no recoverable fallback.
    fn resolve_base(&self) -> Result<RevisionId>;
}

/// Outcome of walking an environment's deployment history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentScan {
    /// SHA of the newest deployment whose latest status is "success".
    pub base: Option<RevisionId>,
    /// Deployment pages fetched.
    pub pages_visited: u32,
    /// Deployments skipped because no status could be read.
    pub skipped: Vec<u64>,
}

/// Base = SHA of the latest successful deployment to an environment.
pub struct LatestSuccessfulDeployment {
    hosting: Arc<dyn HostingApi>,
    repo: RepositoryCoordinates,
    environment: String,
}

impl LatestSuccessfulDeployment {
    /// Look up deployments of `repo` to `environment`.
    #[must_use]
    pub fn new(
        hosting: Arc<dyn HostingApi>,
        repo: RepositoryCoordinates,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            hosting,
            repo,
            environment: environment.into(),
        }
    }

    /// Walk deployments newest first and stop at the first one whose most
    /// recent status is "success".
    ///
    /// # Errors
    ///
    /// Returns an error when a deployment page cannot be listed.
    pub fn scan(&self) -> Result<DeploymentScan> {
        let mut scan = DeploymentScan::default();
        let mut page = 1;

        loop {
            let listing = self
                .hosting
                .list_deployments(&self.repo, &self.environment, page, DEPLOYMENTS_PAGE_SIZE)
                .map_err(|source| Error::Hosting {
                    operation: "list deployments",
                    source,
                })?;
            scan.pages_visited += 1;
            debug!(page, deployments = listing.items.len(), "listed deployments");

            for deployment in listing.items {
                let statuses = match self
                    .hosting
                    .list_deployment_statuses(&self.repo, deployment.id, 1)
                {
                    Ok(statuses) => statuses,
                    Err(err) => {
                        warn!(
                            deployment_id = deployment.id,
                            error = %err,
                            "could not read deployment status, skipping"
                        );
                        scan.skipped.push(deployment.id);
                        continue;
                    }
                };

                let Some(latest) = statuses.first() else {
                    warn!(
                        deployment_id = deployment.id,
                        "no deployment status found, skipping"
                    );
                    scan.skipped.push(deployment.id);
                    continue;
                };

                if latest.is_success() {
                    info!(
                        environment = %self.environment,
                        deployment_id = deployment.id,
                        sha = %deployment.sha,
                        "found latest successful deployment"
                    );
                    scan.base = Some(RevisionId::new(deployment.sha));
                    return Ok(scan);
                }
            }

            match listing.next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        info!(
            environment = %self.environment,
            pages = scan.pages_visited,
            "no successful deployment found"
        );
        Ok(scan)
    }
}

impl RevisionStrategy for LatestSuccessfulDeployment {
    fn name(&self) -> &'static str {
        "deployment"
    }

    fn resolve_base(&self) -> Result<RevisionId> {
        Ok(self.scan()?.base.unwrap_or_default())
    }
}

/// Where a branch tip is looked up.
pub enum BranchSource {
    /// Reference API of the hosted repository.
    Remote {
        /// Hosted repository backend.
        hosting: Arc<dyn HostingApi>,
        /// Repository to query.
        repo: RepositoryCoordinates,
    },
    /// On-disk repository.
    Local {
        /// Repository path.
        path: Utf8PathBuf,
    },
}

/// Base = tip commit of a named branch.
pub struct BranchTip {
    branch: String,
    source: BranchSource,
}

impl BranchTip {
    /// Resolve `branch` through `source`.
    #[must_use]
    pub fn new(branch: impl Into<String>, source: BranchSource) -> Self {
        Self {
            branch: branch.into(),
            source,
        }
    }
}

impl RevisionStrategy for BranchTip {
    fn name(&self) -> &'static str {
        match self.source {
            BranchSource::Remote { .. } => "remote-branch",
            BranchSource::Local { .. } => "local-branch",
        }
    }

    fn resolve_base(&self) -> Result<RevisionId> {
        match &self.source {
            BranchSource::Remote { hosting, repo } => {
                let reference = format!("refs/heads/{}", self.branch);
                match hosting.get_reference(repo, &reference) {
                    Ok(sha) => {
                        info!(branch = %self.branch, %sha, "resolved branch tip");
                        Ok(sha)
                    }
                    Err(err) => {
                        warn!(
                            branch = %self.branch,
                            repository = %repo,
                            error = %err,
                            "could not resolve branch tip, continuing without a base"
                        );
                        Ok(RevisionId::empty())
                    }
                }
            }
            BranchSource::Local { path } => {
                let sha = Repository::open(path)?.branch_tip(&self.branch)?;
                info!(branch = %self.branch, %sha, "resolved local branch tip");
                Ok(sha)
            }
        }
    }
}
