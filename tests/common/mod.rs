//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_pipes::config::{LimitsConfig, ListenerConfig};
use http_pipes::host::Listener;
use http_pipes::{serve, Pipe, PipeService, Shutdown};
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Run one request through a pipe served by `PipeService`.
pub async fn send<P: Pipe>(pipe: P, request: Request<Body>) -> (StatusCode, String) {
    let response = PipeService::new(pipe)
        .oneshot(request)
        .await
        .expect("pipe failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::from(body)).unwrap()
}

/// Serve `pipe` on an ephemeral local port.
///
/// Trigger the returned `Shutdown` to stop the listener.
pub async fn start_server<P: Pipe>(pipe: P) -> (SocketAddr, Shutdown) {
    let (addr, shutdown, _server) = spawn_server(pipe, &LimitsConfig::default()).await;
    (addr, shutdown)
}

/// Like [`start_server`], with explicit limits and a handle on the task
/// running `serve`, which finishes once every connection has drained.
pub async fn spawn_server<P: Pipe>(pipe: P, limits: &LimitsConfig) -> (SocketAddr, Shutdown, JoinHandle<()>) {
    let config = ListenerConfig {
        bind_address: "127.0.0.1:0".to_string(),
        max_connections: 64,
    };
    let listener = Listener::bind(&config).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let service = PipeService::from_limits(pipe, limits);
    let server = tokio::spawn(async move {
        serve(listener, service, signal).await.unwrap();
    });
    (addr, shutdown, server)
}
