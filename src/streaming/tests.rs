use super::server::{ServerState, StreamServer, StreamServerBuilder};
use crate::config::StreamConfig;
use crate::registry::ConnectionRegistry;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use std::sync::Arc;
use tower::util::ServiceExt;

fn test_router() -> axum::Router {
    StreamServer::router(ServerState {
        registry: Arc::new(ConnectionRegistry::new()),
    })
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn version_endpoint_returns_agent_string() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(!body.is_empty());
    assert!(body.starts_with("skelcast/"));
}

#[tokio::test]
async fn plain_request_to_root_gets_400_with_hint() {
    let response = test_router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_string(response).await,
        "WebSocket connection is expected here."
    );
}

#[tokio::test]
async fn unknown_path_gets_400() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/stream")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_method_gets_400() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stream_server_builder() {
    let config = StreamConfig {
        ip: "127.0.0.1".to_string(),
        port: 8080,
    };
    let registry = Arc::new(ConnectionRegistry::new());

    let server = StreamServerBuilder::new()
        .config(config)
        .registry(registry)
        .build()
        .unwrap();

    assert_eq!(server.config.ip, "127.0.0.1");
    assert_eq!(server.config.port, 8080);
}

#[tokio::test]
async fn test_builder_validation() {
    let result = StreamServerBuilder::new()
        .registry(Arc::new(ConnectionRegistry::new()))
        .build();
    assert!(result.is_err());

    let result = StreamServerBuilder::new()
        .config(StreamConfig {
            ip: "127.0.0.1".to_string(),
            port: 8080,
        })
        .build();
    assert!(result.is_err());
}
