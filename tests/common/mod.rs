//! Common test utilities shared across integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! Requests are served by a `wiremock::MockServer`. The server decodes chunked
//! bodies and keeps the request's framing headers, so framing is asserted on
//! the recorded `wiremock::Request`.

#![allow(dead_code)]

use api_client::Client;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::{MockServer, Request};

/// Default timeout for tests that talk to a mock server.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A client pointed at `server`, with a test timeout.
pub fn mock_client(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.uri())
        .timeout(TEST_TIMEOUT)
        .build()
        .unwrap()
}

/// All requests the server received, in order.
pub async fn received(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording is disabled")
}

/// The single request the server received.
pub async fn single_request(server: &MockServer) -> Request {
    let mut requests = received(server).await;
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests.remove(0)
}

pub fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

pub fn is_chunked(request: &Request) -> bool {
    header(request, "transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"))
}

pub fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

/// The request body with its multipart boundary replaced by `BOUNDARY`.
pub fn normalized_multipart_body(request: &Request) -> String {
    let boundary = header(request, "content-type")
        .and_then(|ct| ct.split("boundary=").nth(1))
        .expect("multipart content type without boundary")
        .to_string();
    body_text(request).replace(&boundary, "BOUNDARY")
}

/// Starts a listener that answers one request with `status` and response
/// headers announcing a body it never sends.
///
/// Mock servers send a response in one piece, so a stall after the headers
/// needs a raw socket.
pub async fn start_stalled_body_server(status: u16) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let head = format!(
            "HTTP/1.1 {status} Stalled\r\nContent-Type: application/json\r\nContent-Length: 1024\r\n\r\n{{"
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    base_url
}
