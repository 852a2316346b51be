//! HTTP mock tests for the GitHub backend.
//!
//! The client is blocking, so every call runs on tokio's blocking pool while
//! wiremock serves responses from the test runtime.

use delta_api::{RepositoryCoordinates, RevisionId};
use delta_hosting::GitHubClient;
use delta_hosting_api::{HostingApi, HostingError, HostingResult};
use secrecy::SecretString;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repo() -> RepositoryCoordinates {
    RepositoryCoordinates::parse("owner/repo")
}

async fn with_client<T, F>(server: &MockServer, op: F) -> HostingResult<T>
where
    T: Send + 'static,
    F: FnOnce(&GitHubClient) -> HostingResult<T> + Send + 'static,
{
    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = GitHubClient::new(uri, &SecretString::new("test-token".into()))?;
        op(&client)
    })
    .await
    .expect("blocking task panicked")
}

#[tokio::test]
async fn list_deployments_sends_filters_and_reads_next_page() {
    let server = MockServer::start().await;
    let next = format!(
        "<{}/repos/owner/repo/deployments?environment=production&per_page=50&page=2>; rel=\"next\"",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/deployments"))
        .and(query_param("environment", "production"))
        .and(query_param("per_page", "50"))
        .and(query_param("page", "1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_string(r#"[{"id": 1, "sha": "abc123"}, {"id": 2, "sha": "def456"}]"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = with_client(&server, |client| {
        client.list_deployments(&repo(), "production", 1, 50)
    })
    .await
    .expect("list deployments");

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, 1);
    assert_eq!(page.items[1].sha, "def456");
    assert_eq!(page.next_page, Some(2));
}

#[tokio::test]
async fn list_deployments_last_page_has_no_successor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let page = with_client(&server, |client| {
        client.list_deployments(&repo(), "staging", 1, 50)
    })
    .await
    .expect("list deployments");

    assert!(page.items.is_empty());
    assert_eq!(page.next_page, None);
}

#[tokio::test]
async fn list_deployment_statuses_requests_single_entry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/deployments/1/statuses"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"state": "success"}]"#))
        .expect(1)
        .mount(&server)
        .await;

    let statuses = with_client(&server, |client| {
        client.list_deployment_statuses(&repo(), 1, 1)
    })
    .await
    .expect("list statuses");

    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].is_success());
}

#[tokio::test]
async fn get_reference_returns_object_sha() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "ref": "refs/heads/main",
                "object": {"type": "commit", "sha": "abc123"}
            }"#,
        ))
        .mount(&server)
        .await;

    let sha = with_client(&server, |client| {
        client.get_reference(&repo(), "refs/heads/main")
    })
    .await
    .expect("get reference");

    assert_eq!(sha, RevisionId::new("abc123"));
}

#[tokio::test]
async fn compare_commits_lists_files_in_response_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/compare/base1...head2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"files": [{"filename": "file1.txt"}, {"filename": "file2.go"}]}"#,
        ))
        .mount(&server)
        .await;

    let comparison = with_client(&server, |client| {
        client.compare_commits(&repo(), &"base1".into(), &"head2".into())
    })
    .await
    .expect("compare commits");

    assert_eq!(comparison.filenames(), vec!["file1.txt", "file2.go"]);
}

#[tokio::test]
async fn compare_commits_surfaces_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/compare/base1...head2"))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            r#"{"message": "Not Found", "documentation_url": "https://docs.github.com/rest"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let result = with_client(&server, |client| {
        client.compare_commits(&repo(), &"base1".into(), &"head2".into())
    })
    .await;

    match result {
        Err(HostingError::Status {
            status, message, ..
        }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&server)
        .await;

    let result = with_client(&server, |client| {
        client.get_reference(&repo(), "refs/heads/main")
    })
    .await;

    assert!(matches!(result, Err(HostingError::Decode { .. })));
}
