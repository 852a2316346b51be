//! GitHub REST backend built on a blocking `reqwest` client.

use delta_api::{Deployment, DeploymentStatus, RepositoryCoordinates, RevisionId};
use delta_hosting_api::{Comparison, HostingApi, HostingError, HostingResult, Page};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("delta/", env!("CARGO_PKG_VERSION"));

/// Authenticated client for the GitHub REST API.
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

#[derive(Deserialize)]
struct GitReference {
    object: GitObject,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

impl GitHubClient {
    /// Build a client for `api_url` that authenticates with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error when the token cannot be used as a header value or the
    /// HTTP client fails to initialize.
    pub fn new(api_url: impl Into<String>, token: &SecretString) -> HostingResult<Self> {
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())).map_err(|_| {
                HostingError::message("authentication token contains invalid header characters")
            })?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|err| HostingError::message(format!("failed to build HTTP client: {err}")))?;

        let api_url = api_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, api_url })
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn repo_url(&self, repo: &RepositoryCoordinates, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{tail}",
            self.api_url, repo.owner, repo.name
        )
    }

    fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> HostingResult<(T, Option<u32>)> {
        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .map_err(|err| HostingError::Transport {
                url: url.to_owned(),
                message: err.to_string(),
            })?;

        let status = response.status();
        let next_page = next_page(response.headers());
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(HostingError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = response.json::<T>().map_err(|err| HostingError::Decode {
            url: url.to_owned(),
            message: err.to_string(),
        })?;
        Ok((body, next_page))
    }
}

impl HostingApi for GitHubClient {
    fn id(&self) -> &'static str {
        "github"
    }

    fn list_deployments(
        &self,
        repo: &RepositoryCoordinates,
        environment: &str,
        page: u32,
        per_page: u32,
    ) -> HostingResult<Page<Deployment>> {
        let url = self.repo_url(repo, "deployments");
        let query = [
            ("environment", environment.to_owned()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        let (items, next_page) = self.get::<Vec<Deployment>>(&url, &query)?;
        Ok(Page { items, next_page })
    }

    fn list_deployment_statuses(
        &self,
        repo: &RepositoryCoordinates,
        deployment_id: u64,
        per_page: u32,
    ) -> HostingResult<Vec<DeploymentStatus>> {
        let url = self.repo_url(repo, &format!("deployments/{deployment_id}/statuses"));
        let (statuses, _) = self.get(&url, &[("per_page", per_page.to_string())])?;
        Ok(statuses)
    }

    fn get_reference(
        &self,
        repo: &RepositoryCoordinates,
        reference: &str,
    ) -> HostingResult<RevisionId> {
        let name = reference.strip_prefix("refs/").unwrap_or(reference);
        let url = self.repo_url(repo, &format!("git/ref/{name}"));
        let (found, _) = self.get::<GitReference>(&url, &[])?;
        Ok(RevisionId::new(found.object.sha))
    }

    fn compare_commits(
        &self,
        repo: &RepositoryCoordinates,
        base: &RevisionId,
        head: &RevisionId,
    ) -> HostingResult<Comparison> {
        let url = self.repo_url(repo, &format!("compare/{base}...{head}"));
        let (comparison, _) = self.get(&url, &[])?;
        Ok(comparison)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

/// Page number of the `rel="next"` entry in a `Link` header.
fn next_page(headers: &HeaderMap) -> Option<u32> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|param| param.trim() == r#"rel="next""#) {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiMessage>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.trim().to_owned())
}
