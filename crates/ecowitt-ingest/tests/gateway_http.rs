use std::time::Duration;

use axum::{http::StatusCode, routing::get, Json, Router};
use ecowitt_ingest::{FetchError, GatewayClient, TelemetrySource};
use serde_json::json;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral port, standing in for the gateway
async fn spawn_gateway(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr.to_string()
}

#[tokio::test]
async fn fetches_live_data_payload() {
    let router = Router::new().route(
        "/get_livedata_info",
        get(|| async {
            Json(json!({
                "common_list": [{"id": "0x02", "val": "61.3", "unit": "F"}],
                "wh25": [{"intemp": "71.2", "unit": "F", "inhumi": "40%"}]
            }))
        }),
    );
    let addr = spawn_gateway(router).await;

    let mut client = GatewayClient::new(&addr, Duration::from_secs(2)).unwrap();
    let payload = client.fetch().await.unwrap();
    assert_eq!(payload["common_list"][0]["id"], "0x02");
    assert_eq!(payload["wh25"][0]["inhumi"], "40%");
}

#[tokio::test]
async fn non_success_status_is_fetch_error() {
    let router = Router::new().route(
        "/get_livedata_info",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let addr = spawn_gateway(router).await;

    let mut client = GatewayClient::new(&addr, Duration::from_secs(2)).unwrap();
    assert_eq!(client.fetch().await, Err(FetchError::Status(503)));
}

#[tokio::test]
async fn non_json_body_is_decode_error() {
    let router = Router::new().route(
        "/get_livedata_info",
        get(|| async { "<html>busy</html>" }),
    );
    let addr = spawn_gateway(router).await;

    let mut client = GatewayClient::new(&addr, Duration::from_secs(2)).unwrap();
    assert!(matches!(client.fetch().await, Err(FetchError::Decode(_))));
}

#[tokio::test]
async fn stalled_gateway_times_out() {
    let router = Router::new().route(
        "/get_livedata_info",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    );
    let addr = spawn_gateway(router).await;

    let mut client = GatewayClient::new(&addr, Duration::from_millis(200)).unwrap();
    let started = std::time::Instant::now();
    assert_eq!(client.fetch().await, Err(FetchError::Timeout));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn unreachable_gateway_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let mut client = GatewayClient::new(&addr, Duration::from_secs(2)).unwrap();
    assert!(matches!(client.fetch().await, Err(FetchError::Network(_))));
}
