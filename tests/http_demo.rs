//! Demo routes served in-process.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use provider_balancer::config::{AppConfig, ProviderConfig};
use provider_balancer::http::build_router;
use provider_balancer::HealthCheckMode;

fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.balancer.dispatch_backoff_ms = 10;
    config.demo.requests = 20;
    config.demo.min_work_ms = 1;
    config.demo.max_work_ms = 5;
    config.demo.revive_after_ms = 200;
    config
}

async fn get_json(config: AppConfig, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = build_router(config)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test(start_paused = true)]
async fn test_success_route_dispatches_all_requests() {
    let (status, body) = get_json(fast_config(), "/success").await;
    assert_eq!(status, StatusCode::OK);

    let summary: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary["dispatched"], 20);
    assert_eq!(summary["balancer"]["maximum_supported_requests"], 22);
    assert_eq!(summary["balancer"]["current_processing_requests"], 0);
    assert_eq!(summary["balancer"]["algorithm"], "round_robin");
}

#[tokio::test(start_paused = true)]
async fn test_with_retry_route_waits_for_revival() {
    let (status, body) = get_json(fast_config(), "/with-retry").await;
    assert_eq!(status, StatusCode::OK);

    let summary: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary["dispatched"], 2);
    assert_eq!(summary["balancer"]["providers"][0], "first");
}

#[tokio::test]
async fn test_configuration_errors_map_to_500() {
    let mut config = fast_config();
    config.balancer.max_providers_capacity = 1;
    config.providers = vec![
        ProviderConfig::new("a", 1, HealthCheckMode::None),
        ProviderConfig::new("b", 1, HealthCheckMode::None),
    ];

    let (status, body) = get_json(config, "/success").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8(body).unwrap().contains("maximum number of providers reached"));
}
