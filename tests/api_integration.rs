//! HTTP shell integration tests
//!
//! Drive the API and redirect routers in-process with `oneshot`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use hashurl::models::UrlMapping;
use hashurl::redirect::handlers::TIMING_HEADER;
use hashurl::storage::{SqliteStorage, Storage, StorageError, StorageResult};
use hashurl::{api, redirect, KeyDeriver, Shortener};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const BASE_URL: &str = "http://sho.rt";

/// Helper to create a shortener over in-memory storage
async fn create_test_shortener() -> Arc<Shortener> {
    let storage = SqliteStorage::new("sqlite::memory:", 5).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(Shortener::new(Arc::new(storage), KeyDeriver::default()))
}

/// Storage whose database is unreachable
struct UnreachableStorage;

#[async_trait]
impl Storage for UnreachableStorage {
    async fn init(&self) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn create(&self, _id: &str, _original_url: &str) -> StorageResult<UrlMapping> {
        Err(StorageError::Unavailable(anyhow::anyhow!("connection refused")))
    }

    async fn get(&self, _id: &str) -> StorageResult<Option<UrlMapping>> {
        Err(StorageError::Unavailable(anyhow::anyhow!("connection refused")))
    }

    async fn count(&self) -> StorageResult<i64> {
        Err(StorageError::Unavailable(anyhow::anyhow!("connection refused")))
    }
}

fn unreachable_shortener() -> Arc<Shortener> {
    Arc::new(Shortener::new(
        Arc::new(UnreachableStorage),
        KeyDeriver::default(),
    ))
}

fn shorten_request(url: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/urls")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::json!({ "url": url }).to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_shorten_and_resolve() {
    let shortener = create_test_shortener().await;
    let app = api::create_api_router(shortener, BASE_URL.to_string());

    let (status, json) = send(&app, shorten_request("https://example.com/page")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "created");
    assert_eq!(json["original_url"], "https://example.com/page");

    let id = json["id"].as_str().unwrap().to_string();
    assert_eq!(id, KeyDeriver::default().derive("https://example.com/page"));
    assert_eq!(json["short_url"], format!("{}/{}", BASE_URL, id));

    let request = Request::builder()
        .uri(format!("/api/urls/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["original_url"], "https://example.com/page");
}

#[tokio::test]
async fn test_shorten_again_returns_ok() {
    let shortener = create_test_shortener().await;
    let app = api::create_api_router(Arc::clone(&shortener), BASE_URL.to_string());

    let (first_status, first) = send(&app, shorten_request("https://example.com")).await;
    let (second_status, second) = send(&app, shorten_request("https://example.com")).await;

    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second["status"], "already_exists");
    assert_eq!(first["id"], second["id"]);
    assert_eq!(shortener.stats().await.unwrap(), 1);
}

#[tokio::test]
async fn test_rejects_bad_scheme() {
    let shortener = create_test_shortener().await;
    let app = api::create_api_router(Arc::clone(&shortener), BASE_URL.to_string());

    for url in ["", "example.com", "ftp://example.com", "javascript:alert(1)"] {
        let (status, json) = send(&app, shorten_request(url)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "url {:?}", url);
        assert!(json["error"].is_string());
    }

    assert_eq!(shortener.stats().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let shortener = create_test_shortener().await;
    let app = api::create_api_router(shortener, BASE_URL.to_string());

    let request = Request::builder()
        .uri("/api/urls/deadbeef")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "URL not found");
}

#[tokio::test]
async fn test_concurrent_shorten_requests() {
    let shortener = create_test_shortener().await;
    let app = api::create_api_router(Arc::clone(&shortener), BASE_URL.to_string());

    let mut handles = vec![];
    for _ in 0..10 {
        let app_clone = app.clone();
        handles.push(tokio::spawn(async move {
            app_clone
                .oneshot(shorten_request("https://example.com/concurrent"))
                .await
                .unwrap()
                .status()
        }));
    }

    let mut created = 0;
    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::OK => ok += 1,
            other => panic!("Unexpected status: {}", other),
        }
    }

    assert_eq!(created, 1, "Exactly one request should create the mapping");
    assert_eq!(ok, 9);
    assert_eq!(shortener.stats().await.unwrap(), 1);
}

#[tokio::test]
async fn test_health() {
    let shortener = create_test_shortener().await;
    let app = api::create_api_router(shortener, BASE_URL.to_string());

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "OK");
}

#[tokio::test]
async fn test_redirect_to_original_url() {
    let shortener = create_test_shortener().await;
    let id = shortener
        .shorten("https://example.com/target")
        .await
        .unwrap()
        .id;
    let app = redirect::create_redirect_router(shortener);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/target"
    );
    assert!(response.headers().contains_key(TIMING_HEADER));
}

#[tokio::test]
async fn test_redirect_unknown_id() {
    let shortener = create_test_shortener().await;
    let app = redirect::create_redirect_router(shortener);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/00000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_storage_fault_is_service_unavailable() {
    let app = api::create_api_router(unreachable_shortener(), BASE_URL.to_string());

    let (status, json) = send(&app, shorten_request("https://example.com")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].is_string());

    let request = Request::builder()
        .uri("/api/urls/deadbeef")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_redirect_storage_fault_is_service_unavailable() {
    let app = redirect::create_redirect_router(unreachable_shortener());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/deadbeef")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_redirect_to_unencodable_url() {
    let shortener = create_test_shortener().await;
    let app = api::create_api_router(Arc::clone(&shortener), BASE_URL.to_string());

    // Passes the scheme check, but a newline can not go in a Location header
    let (status, json) = send(&app, shorten_request("https://a.com/x\ny")).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json["id"].as_str().unwrap().to_string();

    let response = redirect::create_redirect_router(shortener)
        .oneshot(
            Request::builder()
                .uri(format!("/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_redirect_health() {
    let shortener = create_test_shortener().await;
    let app = redirect::create_redirect_router(shortener);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
}

#[tokio::test]
async fn test_collision_reports_stored_url() {
    // One hex character leaves 16 ids, so colliding URLs are easy to find
    let deriver = KeyDeriver::new(1).unwrap();
    let storage = SqliteStorage::new("sqlite::memory:", 5).await.unwrap();
    storage.init().await.unwrap();
    let shortener = Arc::new(Shortener::new(Arc::new(storage), deriver));
    let app = api::create_api_router(Arc::clone(&shortener), BASE_URL.to_string());

    let first = "https://example.com/0".to_string();
    let target = deriver.derive(&first);
    let second = (1..)
        .map(|i| format!("https://example.com/{}", i))
        .find(|u| deriver.derive(u) == target)
        .unwrap();

    let (status, _) = send(&app, shorten_request(&first)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(&app, shorten_request(&second)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "collision");
    assert_eq!(json["id"], target.as_str());
    assert_eq!(json["original_url"], first.as_str());

    assert_eq!(shortener.resolve(&target).await.unwrap(), Some(first));
    assert_eq!(shortener.stats().await.unwrap(), 1);
}
