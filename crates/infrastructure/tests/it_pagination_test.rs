//! Integration tests for cursor pagination over a real HTTP stack

use std::sync::Arc;

use mockito::{Matcher, Server};
use serde::Deserialize;
use turnpike_application::{InMemoryTokenStorage, PagerOptions};
use turnpike_domain::{ApiConfig, PageMetaKeys, PageParams, TokenPair};
use turnpike_infrastructure::{ApiStack, ReqwestTransport};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct Project {
    id: u64,
    name: String,
}

async fn stack_for(server: &Server) -> ApiStack {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let transport = Arc::new(ReqwestTransport::new().expect("transport"));
    let storage = Arc::new(InMemoryTokenStorage::new());
    let stack = ApiStack::new(ApiConfig::new(server.url()), transport, storage).expect("stack");
    stack
        .token_store()
        .set(TokenPair::new("tok", "ref"))
        .await
        .expect("seed tokens");
    stack
}

fn page(ids: &[u64], cursor: Option<&str>, has_more: bool) -> String {
    let items: Vec<_> = ids
        .iter()
        .map(|id| serde_json::json!({"id": id, "name": format!("project-{id}")}))
        .collect();
    serde_json::json!({
        "data": items,
        "meta": {"next_cursor": cursor, "has_next_page": has_more}
    })
    .to_string()
}

#[tokio::test]
async fn walks_all_pages_in_order() {
    //* Given
    let mut server = Server::new_async().await;

    // Later-created mocks take priority, so the cursorless catch-all
    // goes first and the cursor-specific pages shadow it.
    server
        .mock("GET", "/v1/projects")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page(&[1, 2], Some("c2"), true))
        .create_async()
        .await;
    server
        .mock("GET", "/v1/projects")
        .match_query(Matcher::UrlEncoded("cursor".into(), "c2".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page(&[3, 4], Some("c3"), true))
        .create_async()
        .await;
    server
        .mock("GET", "/v1/projects")
        .match_query(Matcher::UrlEncoded("cursor".into(), "c3".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page(&[5], None, false))
        .create_async()
        .await;

    //* When
    let stack = stack_for(&server).await;
    let pager = stack.pager::<Project>("/v1/projects", PagerOptions::default());

    pager.load_more().await;
    pager.load_more().await;
    pager.load_more().await;
    // Exhausted; must not hit the server again.
    pager.load_more().await;

    //* Then
    let data = pager.data().await;
    assert_eq!(data.len(), 5);
    assert_eq!(
        data.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
    assert!(!pager.has_next_page().await);
    assert!(pager.error().await.is_none());
}

#[tokio::test]
async fn refresh_restarts_from_the_first_page() {
    //* Given
    let mut server = Server::new_async().await;
    let first_page = server
        .mock("GET", "/v1/projects")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page(&[1, 2], None, false))
        .expect(2)
        .create_async()
        .await;

    //* When
    let stack = stack_for(&server).await;
    let pager = stack.pager::<Project>("/v1/projects", PagerOptions::default());
    pager.refresh().await;
    let before = pager.data().await;
    pager.refresh().await;

    //* Then
    first_page.assert_async().await;
    assert_eq!(pager.data().await, before);
    assert_eq!(pager.data().await.len(), 2);
}

#[tokio::test]
async fn parameter_change_resets_accumulation() {
    //* Given
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/projects")
        .match_query(Matcher::UrlEncoded("status".into(), "active".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page(&[1, 2], None, false))
        .create_async()
        .await;
    server
        .mock("GET", "/v1/projects")
        .match_query(Matcher::UrlEncoded("status".into(), "archived".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page(&[9], None, false))
        .create_async()
        .await;

    //* When
    let stack = stack_for(&server).await;
    let pager = stack.pager::<Project>(
        "/v1/projects",
        PagerOptions {
            params: PageParams::from([("status".to_string(), "active".to_string())]),
            ..PagerOptions::default()
        },
    );
    pager.load_more().await;
    assert_eq!(pager.data().await.len(), 2);

    pager
        .set_params(PageParams::from([(
            "status".to_string(),
            "archived".to_string(),
        )]))
        .await;

    //* Then
    let data = pager.data().await;
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].id, 9);
}

#[tokio::test]
async fn honors_custom_meta_keys() {
    //* Given
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/projects")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "data": [{"id": 1, "name": "project-1"}],
                "meta": {"afterCursor": "a1", "hasMore": true}
            })
            .to_string(),
        )
        .create_async()
        .await;

    //* When
    let stack = stack_for(&server).await;
    let pager = stack.pager::<Project>(
        "/v1/projects",
        PagerOptions {
            meta_keys: PageMetaKeys::new("afterCursor", "hasMore"),
            ..PagerOptions::default()
        },
    );
    pager.load_more().await;

    //* Then
    assert_eq!(pager.data().await.len(), 1);
    assert!(pager.has_next_page().await);
}

#[tokio::test]
async fn expired_token_refreshes_mid_walk() {
    //* Given
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/projects")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer tok")
        .with_status(401)
        .create_async()
        .await;
    let refresh_mock = server
        .mock("POST", "/v1/auth/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"new","refresh_token":"new2"}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/v1/projects")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer new")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page(&[1, 2], None, false))
        .create_async()
        .await;

    //* When
    let stack = stack_for(&server).await;
    let pager = stack.pager::<Project>("/v1/projects", PagerOptions::default());
    pager.load_more().await;

    //* Then
    refresh_mock.assert_async().await;
    assert_eq!(pager.data().await.len(), 2);
    assert!(pager.error().await.is_none());
}

#[tokio::test]
async fn server_error_is_captured_for_retry() {
    //* Given
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/projects")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"maintenance"}"#)
        .create_async()
        .await;

    //* When
    let stack = stack_for(&server).await;
    let pager = stack.pager::<Project>("/v1/projects", PagerOptions::default());
    pager.load_more().await;

    //* Then
    assert!(pager.data().await.is_empty());
    assert!(!pager.loading().await);
    let error = pager.error().await.expect("captured error");
    assert!(error.to_string().contains("maintenance"));
}
