//! Integration tests for JSON requests, headers and error mapping.

mod common;

use api_client::{ApiError, Client};
use common::{
    header, is_chunked, mock_client, single_request, start_stalled_body_server,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Pet {
    id: u64,
    name: String,
    status: String,
}

#[tokio::test]
async fn test_get_json_with_query_and_headers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/pet/findByStatus"))
        .and(query_param("status", "available sold"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "name": "rex", "status": "available"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/v2/", mock_server.uri()))
        .api_key("secret-key")
        .user_agent("petstore-tests/1.0")
        .default_header("X-Tenant", "acme")
        .build()
        .unwrap();

    let pets: Vec<Pet> = client
        .get_json("/pet/findByStatus", &[("status", "available sold")])
        .await
        .unwrap();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].name, "rex");

    let request = single_request(&mock_server).await;
    assert_eq!(request.url.query(), Some("status=available%20sold"));
    assert_eq!(header(&request, "x-api-key"), Some("secret-key"));
    assert_eq!(header(&request, "user-agent"), Some("petstore-tests/1.0"));
    assert_eq!(header(&request, "x-tenant"), Some("acme"));
}

#[tokio::test]
async fn test_custom_api_key_header() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/store/inventory"))
        .and(wiremock::matchers::header("api_key", "k-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .api_key("k-123")
        .api_key_header("api_key")
        .build()
        .unwrap();

    let _: serde_json::Value = client.get_json("/store/inventory", &[]).await.unwrap();

    let request = single_request(&mock_server).await;
    assert!(header(&request, "x-api-key").is_none());
}

#[tokio::test]
async fn test_post_json_sends_body() {
    let pet = Pet {
        id: 42,
        name: "doggie".to_string(),
        status: "pending".to_string(),
    };

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pet"))
        .and(wiremock::matchers::header("content-type", "application/json"))
        .and(body_json(&pet))
        .respond_with(ResponseTemplate::new(200).set_body_json(&pet))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let created: Pet = client.post_json("/pet", &pet).await.unwrap();
    assert_eq!(created, pet);
}

#[tokio::test]
async fn test_json_requests_ignore_chunked_switch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    client.enable_chunked_transfer();

    let _: serde_json::Value = client
        .post_json("/pet", &serde_json::json!({"name": "doggie"}))
        .await
        .unwrap();

    let request = single_request(&mock_server).await;
    assert!(!is_chunked(&request));
    assert!(header(&request, "content-length").is_some());
}

#[tokio::test]
async fn test_delete() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/pet/42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    client.delete("/pet/42").await.unwrap();
}

#[tokio::test]
async fn test_error_status_maps_to_api_error() {
    let long_message = "x".repeat(500);
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pet/999"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"message": long_message}))
                .insert_header("x-request-id", "req-404"),
        )
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let err = client.get_json::<Pet>("/pet/999", &[]).await.unwrap_err();

    match &err {
        ApiError::Api {
            status_code,
            message,
            request_id,
        } => {
            assert_eq!(*status_code, 404);
            assert!(message.ends_with("..."));
            assert!(message.len() <= 203);
            assert_eq!(request_id.as_deref(), Some("req-404"));
        }
        other => panic!("Expected ApiError::Api, got {:?}", other),
    }
    assert!(!err.is_retryable());
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let err = client.delete("/pet/1").await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test]
async fn test_malformed_success_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pet/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"unexpected": true})),
        )
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let err = client.get_json::<Pet>("/pet/1", &[]).await.unwrap_err();
    match err {
        ApiError::MalformedResponse(msg) => {
            assert!(msg.contains("Pet"));
            assert!(msg.contains("unexpected"));
        }
        other => panic!("Expected MalformedResponse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_before_response_maps_to_timeout_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let timeout = Duration::from_millis(300);
    let client = Client::builder()
        .base_url(mock_server.uri())
        .timeout(timeout)
        .build()
        .unwrap();

    let err = client
        .get_json::<serde_json::Value>("/slow", &[])
        .await
        .unwrap_err();
    match err {
        ApiError::Timeout(duration) => assert_eq!(duration, timeout),
        other => panic!("Expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_while_reading_body_maps_to_timeout_error() {
    let timeout = Duration::from_millis(300);

    for status in [200, 500] {
        let base_url = start_stalled_body_server(status).await;
        let client = Client::builder()
            .base_url(base_url)
            .timeout(timeout)
            .build()
            .unwrap();

        let err = client
            .get_json::<serde_json::Value>("/stalled", &[])
            .await
            .unwrap_err();
        match err {
            ApiError::Timeout(duration) => assert_eq!(duration, timeout, "status={status}"),
            other => panic!("status={status}: expected Timeout, got {:?}", other),
        }
    }
}
