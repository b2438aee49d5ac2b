//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: GithubApi → HttpClient → mock GitHub

use futures::TryStreamExt;
use github_api_core::{ClientConfig, Error, ErrorKind, GithubApi, PageMode};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> GithubApi {
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .token("test-token")
        .rate_limit_retry(Duration::from_millis(10), 3)
        .transfer_retry(Duration::from_millis(10), 3)
        .graphql_retry(Duration::from_millis(10), 3)
        .build();
    GithubApi::new(config).unwrap()
}

fn link(server: &MockServer, rel: &str, endpoint: &str) -> String {
    format!("<{}{}>; rel=\"{}\"", server.uri(), endpoint, rel)
}

/// Three pages of repositories linked through `next`
async fn mount_repo_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 3, "name": "c", "fork": false}]))
                .insert_header("link", link(server, "next", "/orgs/acme/repos?page=3").as_str()),
        )
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 4, "name": "d", "fork": true}])),
        )
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    {"id": 1, "name": "a", "fork": false},
                    {"id": 2, "name": "b", "fork": false}
                ]))
                .insert_header("link", link(server, "next", "/orgs/acme/repos?page=2").as_str()),
        )
        .mount(server)
        .await;
}

// ============================================================================
// REST Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_get_single_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"full_name": "acme/widgets"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let response = api
        .get("/repos/acme/widgets", PageMode::Single, None)
        .await
        .unwrap()
        .into_response()
        .unwrap();

    assert_eq!(response.json().unwrap()["full_name"], "acme/widgets");
}

#[tokio::test]
async fn test_get_all_follows_next_links() {
    let mock_server = MockServer::start().await;
    mount_repo_pages(&mock_server).await;

    let api = api_for(&mock_server);
    let items = api
        .get("/orgs/acme/repos", PageMode::All, Some(&["id"][..]))
        .await
        .unwrap()
        .into_items()
        .unwrap();

    assert_eq!(
        items,
        vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3}), json!({"id": 4})]
    );
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_page_yields_batches() {
    let mock_server = MockServer::start().await;
    mount_repo_pages(&mock_server).await;

    let api = api_for(&mock_server);
    let mut pages = api
        .get("/orgs/acme/repos", PageMode::Page, None)
        .await
        .unwrap()
        .into_pages()
        .unwrap();

    let first = pages.next_page().await.unwrap().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);

    let rest: Vec<Vec<Value>> = pages.into_stream().try_collect().await.unwrap();
    assert_eq!(rest.len(), 2);
    assert_eq!(rest[1][0]["name"], "d");
}

#[tokio::test]
async fn test_get_all_rejects_foreign_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1}]))
                .insert_header("link", "<https://evil.example.com/orgs/acme/repos?page=2>; rel=\"next\""),
        )
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let err = api
        .get("/orgs/acme/repos", PageMode::All, None)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, Error::CrossHostLink { .. }));
    assert_eq!(err.kind(), ErrorKind::ProtocolAddressing);
}

// ============================================================================
// Retry Tests
// ============================================================================

#[tokio::test]
async fn test_rate_limited_403_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/members"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"message": "API rate limit exceeded"}))
                .insert_header("x-ratelimit-remaining", "0"),
        )
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"login": "octocat"}])))
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let items = api
        .get("/orgs/acme/members", PageMode::All, None)
        .await
        .unwrap()
        .into_items()
        .unwrap();

    assert_eq!(items, vec![json!({"login": "octocat"})]);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_rate_limited_403_gives_up_after_cap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/members"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"message": "API rate limit exceeded"}))
                .insert_header("x-ratelimit-remaining", "0"),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let err = api
        .get("/orgs/acme/members", PageMode::Single, None)
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::RateLimit);
}

#[tokio::test]
async fn test_permission_403_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/audit-log"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "Must have admin rights"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let err = api
        .get("/orgs/acme/audit-log", PageMode::Single, None)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, Error::HttpStatus { status: 403, .. }));
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

// ============================================================================
// Total Tests
// ============================================================================

#[tokio::test]
async fn test_total_from_last_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("page", "208"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}, {"id": 3}])))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("per_page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1}]))
                .insert_header(
                    "link",
                    link(&mock_server, "last", "/orgs/acme/repos?per_page=30&page=208").as_str(),
                ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    assert_eq!(api.total("/orgs/acme/repos").await.unwrap(), 6213);
}

#[tokio::test]
async fn test_total_single_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/labels"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "bug"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    assert_eq!(api.total("/repos/acme/widgets/labels").await.unwrap(), 1);
}

#[tokio::test]
async fn test_total_rejects_per_page() {
    let mock_server = MockServer::start().await;
    let api = api_for(&mock_server);

    let err = api.total("/orgs/acme/repos?per_page=5").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Caller);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// GraphQL Tests
// ============================================================================

const STARGAZERS: &str = r"
query($owner: String!, $name: String!, $page_size: Int!, $cursor: String!) {
  repository(owner: $owner, name: $name) {
    stargazers(first: $page_size, after: $cursor) {
      edges { node { login } }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

fn stargazers_page(logins: &[&str], end_cursor: Option<&str>) -> Value {
    let edges: Vec<Value> = logins.iter().map(|l| json!({"node": {"login": l}})).collect();
    json!({"data": {"repository": {"stargazers": {
        "edges": edges,
        "pageInfo": {"hasNextPage": end_cursor.is_some(), "endCursor": end_cursor}
    }}}})
}

#[tokio::test]
async fn test_graphql_paged_traversal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({"variables": {"cursor": "Y3Vyc29yOjI="}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(stargazers_page(&["carol"], None)))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(stargazers_page(&["alice", "bob"], Some("Y3Vyc29yOjI="))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let pages: Vec<Vec<Value>> = api
        .graphql(
            STARGAZERS,
            json!({"owner": "acme", "name": "widgets"}),
            true,
            Some("repository.stargazers.edges"),
        )
        .await
        .unwrap()
        .into_pages()
        .unwrap()
        .into_stream()
        .try_collect()
        .await
        .unwrap();

    let logins: Vec<&str> = pages
        .iter()
        .flatten()
        .filter_map(|edge| edge["node"]["login"].as_str())
        .collect();
    assert_eq!(logins, vec!["alice", "bob", "carol"]);

    let requests = mock_server.received_requests().await.unwrap();
    let first: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(!first["query"].as_str().unwrap().contains("$cursor"));
    assert_eq!(first["variables"]["page_size"], 100);
}

#[tokio::test]
async fn test_graphql_rate_limited_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"type": "RATE_LIMITED", "message": "API rate limit exceeded for user"}]
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"viewer": {"login": "octocat"}}})))
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let response = api
        .graphql("query { viewer { login } }", json!({}), false, None)
        .await
        .unwrap()
        .into_response()
        .unwrap();

    assert_eq!(response.json().unwrap()["data"]["viewer"]["login"], "octocat");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_graphql_error_is_immediate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"type": "NOT_FOUND", "message": "Could not resolve to a Repository"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let err = api
        .graphql("query { repository(owner: \"a\", name: \"b\") { id } }", json!({}), false, None)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, Error::Graphql { .. }));
}
