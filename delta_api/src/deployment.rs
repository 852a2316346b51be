use serde::{Deserialize, Serialize};

/// State string reported by a deployment status that marks success.
pub const SUCCESS_STATE: &str = "success";

/// A single deployment recorded against an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Backend identifier of the deployment.
    pub id: u64,
    /// Commit SHA that was deployed.
    pub sha: String,
}

/// One status entry attached to a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    /// Raw state string (e.g., "success", "failure", "in_progress").
    pub state: String,
}

impl DeploymentStatus {
    /// Whether the status reports a successful deployment.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == SUCCESS_STATE
    }
}
