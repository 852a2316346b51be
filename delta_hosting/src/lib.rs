//! Hosted repository backends for the delta engine.

mod github;

pub use github::{GitHubClient, DEFAULT_API_URL};
