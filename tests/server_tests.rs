// Router tests: requests delivered as fetch signals
// Author: kelexine (https://github.com/kelexine)

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{harness, harness_at, FakeFetcher};
use offline_cache::models::CachedResponse;
use offline_cache::server::{create_router, HealthResponse, HealthStatus, SOURCE_HEADER};
use reqwest::Url;
use tower::ServiceExt;

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_cached_asset_served_with_hit_header() {
    let h = harness(FakeFetcher::with_site());
    h.handler.install().await.unwrap();
    let app = create_router(h.handler.clone());

    let response = app.oneshot(get("/index.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SOURCE_HEADER], "hit");
    assert_eq!(response.headers()["content-type"], "text/html");
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_string(response).await, "<html>index</html>");
}

#[tokio::test]
async fn test_miss_then_offline_fallback() {
    let h = harness(FakeFetcher::with_site());
    h.handler.install().await.unwrap();
    let app = create_router(h.handler.clone());

    let live = app.clone().oneshot(get("/style.css")).await.unwrap();
    assert_eq!(live.headers()[SOURCE_HEADER], "miss");

    h.fetcher.set_online(false);
    let offline = app.oneshot(get("/script.js")).await.unwrap();
    assert_eq!(offline.status(), StatusCode::OK);
    assert_eq!(offline.headers()[SOURCE_HEADER], "fallback");
    assert_eq!(body_string(offline).await, "<html>index</html>");
}

#[tokio::test]
async fn test_offline_without_fallback_is_bad_gateway() {
    let fetcher = FakeFetcher::with_site();
    fetcher.set_online(false);
    let h = harness(fetcher);
    let app = create_router(h.handler.clone());

    let response = app.oneshot(get("/style.css")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_string(response).await.contains("network_error"));
}

#[tokio::test]
async fn test_upstream_status_passes_through() {
    let h = harness(FakeFetcher::with_site());
    let app = create_router(h.handler.clone());

    let response = app.oneshot(get("/does-not-exist")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[SOURCE_HEADER], "miss");
}

#[tokio::test]
async fn test_query_string_reaches_fetcher() {
    let h = harness(FakeFetcher::with_site());
    let app = create_router(h.handler.clone());

    app.oneshot(get("/index.html?v=2")).await.unwrap();
    assert_eq!(
        h.fetcher.calls(),
        vec!["GET http://app.test/index.html?v=2".to_string()]
    );
}

#[tokio::test]
async fn test_scheme_relative_path_stays_on_origin() {
    let h = harness(FakeFetcher::with_site());
    let app = create_router(h.handler.clone());

    let response = app.oneshot(get("//other.host/x")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        h.fetcher.calls(),
        vec!["GET http://app.test/other.host/x".to_string()]
    );
    assert!(h.fetcher.calls().iter().all(|c| !c.contains("//other.host")));
}

#[tokio::test]
async fn test_local_root_mounted_at_subdirectory_scope() {
    let scope = Url::parse("http://app.test/game/").unwrap();
    let fetcher = FakeFetcher::new();
    for (path, body) in [
        ("./", "root"),
        ("./index.html", "<html>game</html>"),
        ("./manifest.webmanifest", "{}"),
    ] {
        fetcher.serve_url(&scope.join(path).unwrap(), CachedResponse::new(200, body));
    }
    let h = harness_at(fetcher, scope);
    h.handler.install().await.unwrap();
    let app = create_router(h.handler.clone());

    let response = app.clone().oneshot(get("/index.html")).await.unwrap();
    assert_eq!(response.headers()[SOURCE_HEADER], "hit");
    assert_eq!(body_string(response).await, "<html>game</html>");

    h.fetcher.set_online(false);
    let offline = app.oneshot(get("/level/2.json")).await.unwrap();
    assert_eq!(offline.headers()[SOURCE_HEADER], "fallback");
    assert_eq!(body_string(offline).await, "<html>game</html>");
}

#[tokio::test]
async fn test_health_reports_offline_readiness() {
    let h = harness(FakeFetcher::with_site());
    let app = create_router(h.handler.clone());

    let before = app
        .clone()
        .oneshot(get("/_offline-cache/health"))
        .await
        .unwrap();
    let before: HealthResponse = serde_json::from_str(&body_string(before).await).unwrap();
    assert_eq!(before.status, HealthStatus::Degraded);
    assert!(!before.offline_ready);
    assert!(before.buckets.is_empty());

    h.handler.install().await.unwrap();

    let after = app.oneshot(get("/_offline-cache/health")).await.unwrap();
    let after: HealthResponse = serde_json::from_str(&body_string(after).await).unwrap();
    assert_eq!(after.status, HealthStatus::Healthy);
    assert_eq!(after.cache_name, "watch-tycoon-v1");
    assert_eq!(after.buckets.len(), 1);
    assert_eq!(after.buckets[0].entries, 3);
    assert_eq!(h.fetcher.call_count(), 3);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let h = harness(FakeFetcher::with_site());
    h.handler.install().await.unwrap();
    let app = create_router(h.handler.clone());

    let response = app.oneshot(get("/_offline-cache/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("installs_total"));
}
