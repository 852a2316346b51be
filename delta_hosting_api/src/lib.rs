//! Capability interface for hosted repository services.

mod types;

use delta_api::{Deployment, DeploymentStatus, RepositoryCoordinates, RevisionId};

pub use types::{CompareFile, Comparison, HostingError, HostingResult, Page};

/// Page size used when walking deployment history.
pub const DEPLOYMENTS_PAGE_SIZE: u32 = 50;

/// Trait implemented by hosted repository backends (e.g., GitHub).
pub trait HostingApi: Send + Sync {
    /// Stable identifier used for logging.
    fn id(&self) -> &'static str;

    /// List one page of deployments for an environment, newest first.
    ///
    /// # Errors
    ///
    /// Implementors should surface transport and non-success responses.
    fn list_deployments(
        &self,
        repo: &RepositoryCoordinates,
        environment: &str,
        page: u32,
        per_page: u32,
    ) -> HostingResult<Page<Deployment>>;

    /// List statuses for a deployment, most recent first.
    ///
    /// # Errors
    ///
    /// Implementors should surface transport and non-success responses.
    fn list_deployment_statuses(
        &self,
        repo: &RepositoryCoordinates,
        deployment_id: u64,
        per_page: u32,
    ) -> HostingResult<Vec<DeploymentStatus>>;

    /// Resolve a reference such as `refs/heads/main` to the commit it points at.
    ///
    /// # Errors
    ///
    /// Returns an error when the reference does not exist or the call fails.
    fn get_reference(&self, repo: &RepositoryCoordinates, reference: &str)
        -> HostingResult<RevisionId>;

    /// Compare two commits (`base...head`).
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success response.
    fn compare_commits(
        &self,
        repo: &RepositoryCoordinates,
        base: &RevisionId,
        head: &RevisionId,
    ) -> HostingResult<Comparison>;
}
