//! Error handling utilities for HTTP responses and error context formatting.

use crate::errors::ApiError;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Maximum characters to include from a body in error messages
const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

/// Request ID header name, used to correlate failures with server logs.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Checks if an HTTP response is successful, returning it if so or an error otherwise.
///
/// # Errors
///
/// Returns [`ApiError::Api`] with status code and body preview on non-success
/// status, or [`ApiError::Timeout`] if the error body read times out.
pub(crate) async fn check_response(
    response: Response,
    timeout: Option<Duration>,
) -> Result<Response, ApiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(read_error_with_context(response, timeout).await)
    }
}

/// Reads an error response body and builds an [`ApiError::Api`] with context.
///
/// Extracts the status code, a truncated body preview and the request ID
/// header. If the body cannot be read, the message describes the read failure,
/// except for a timeout with `timeout` configured, which becomes
/// [`ApiError::Timeout`].
pub(crate) async fn read_error_with_context(
    response: Response,
    timeout: Option<Duration>,
) -> ApiError {
    let status_code = response.status().as_u16();

    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let error_body = match response.text().await {
        Ok(body) => body,
        Err(e) => match map_transport_error(e, timeout) {
            ApiError::Timeout(duration) => {
                log::debug!(
                    "Timed out reading HTTP {} error body (request_id={:?})",
                    status_code,
                    request_id
                );
                return ApiError::Timeout(duration);
            }
            other => format!("Failed to read error body: {}", other),
        },
    };

    log::debug!(
        "API returned HTTP {} (request_id={:?})",
        status_code,
        request_id
    );

    ApiError::Api {
        status_code,
        message: truncate_for_context(&error_body, ERROR_BODY_PREVIEW_LENGTH),
        request_id,
    }
}

/// Deserializes a successful response body, naming the target type on failure.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] with a preview of the body.
pub(crate) fn deserialize_with_context<T: DeserializeOwned>(
    body: &str,
    type_name: &str,
) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        log::warn!("Failed to parse {} from response: {}", type_name, e);
        ApiError::MalformedResponse(format!(
            "Failed to parse {}: {} | Context: {}",
            type_name,
            e,
            truncate_for_context(body, ERROR_BODY_PREVIEW_LENGTH)
        ))
    })
}

/// Maps a reqwest error from sending a request or reading its body, turning
/// timeouts into [`ApiError::Timeout`] when the client has a configured timeout.
pub(crate) fn map_transport_error(error: reqwest::Error, timeout: Option<Duration>) -> ApiError {
    match timeout {
        Some(duration) if error.is_timeout() => ApiError::Timeout(duration),
        _ => ApiError::Http(error),
    }
}

/// Truncates a string to specified length, adding "..." if truncated.
///
/// Slices on a character boundary so multi-byte UTF-8 input never panics.
pub(crate) fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncate_at = s
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..truncate_at])
    }
}
