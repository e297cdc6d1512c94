//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

use inference_firewall::config::FirewallConfig;
use inference_firewall::http::{build_router, AppState};
use inference_firewall::lifecycle::build_pipeline;
use inference_firewall::RequestPipeline;

pub const PEER: &str = "203.0.113.7:40000";
pub const STUB_RESPONSE: &str = r#"{"choices":[{"message":{"role":"assistant","content":"stub"}}]}"#;

/// Raw requests received by a mock upstream, in arrival order.
pub type Captured = Arc<Mutex<Vec<String>>>;

/// Start a programmable mock upstream on an ephemeral port.
///
/// `f` yields the status and body for each request.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> (SocketAddr, Captured)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::default();
    let f = Arc::new(f);

    let log = captured.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                log.lock().unwrap().push(request);

                let (status, body) = f().await;
                let reason = StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown");
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, captured)
}

/// Mock upstream answering 200 with [`STUB_RESPONSE`].
pub async fn start_mock_upstream() -> (SocketAddr, Captured) {
    start_programmable_upstream(|| async { (200, STUB_RESPONSE.to_string()) }).await
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Defaults pointed at `upstream`, with a small window for tests.
pub fn test_config(upstream: SocketAddr, max_requests: usize) -> FirewallConfig {
    let mut config = FirewallConfig::default();
    config.upstream.url = format!("http://{upstream}/v1/chat/completions");
    config.upstream.api_key = Some("test-key".to_string());
    config.upstream.timeout_secs = 2;
    config.rate_limit.max_requests = max_requests;
    config
}

/// Public router plus the pipeline behind it, peer fixed at [`PEER`].
pub fn firewall(config: &FirewallConfig) -> (Router, Arc<RequestPipeline>) {
    let pipeline = Arc::new(build_pipeline(config).unwrap());
    let state = AppState {
        pipeline: pipeline.clone(),
        trust_forwarded_for: config.listener.trust_forwarded_for,
    };
    let peer: SocketAddr = PEER.parse().unwrap();
    let router = build_router(config, state).layer(MockConnectInfo(peer));
    (router, pipeline)
}

pub fn infer_request(body: impl Into<Body>) -> Request<Body> {
    Request::post("/infer")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
