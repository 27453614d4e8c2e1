use thiserror::Error;

/// Defines errors that can occur when talking to the API.
///
/// # Example: Handling API Errors
///
/// ```ignore
/// match client.get_json::<serde_json::Value>("/pets", &[]).await {
///     Err(ApiError::Api { status_code: 429, request_id, .. }) => {
///         log::warn!("Rate limited, request_id: {:?}", request_id);
///     }
///     Err(ApiError::Api { status_code, message, .. }) => {
///         log::error!("API error {}: {}", status_code, message);
///     }
///     // ...
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Reading a file parameter failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// API error with the context needed for debugging and automated handling.
    #[error("API error (HTTP {status_code}): {message}")]
    Api {
        /// HTTP status code (e.g., 400, 429, 500)
        status_code: u16,
        /// Error message from the response body, truncated
        message: String,
        /// Request ID from the `x-request-id` header, if available
        request_id: Option<String>,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The API answered with a success status but the body did not match the
    /// expected schema.
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),
    /// Request exceeded the timeout configured on the client.
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
    /// Failed to build the underlying HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// Returns `true` if this error is likely transient and the request may succeed on retry.
    ///
    /// Retryable:
    /// - **HTTP errors**: connection resets, DNS or TLS failures
    /// - **Rate limits (429)** and **server errors (5xx)**
    /// - **Timeouts**
    ///
    /// Everything else (4xx other than 429, bad input, parse failures) is
    /// permanent.
    ///
    /// ```rust
    /// use api_client::ApiError;
    /// use std::time::Duration;
    ///
    /// let rate_limited = ApiError::Api {
    ///     status_code: 429,
    ///     message: "Too many requests".to_string(),
    ///     request_id: None,
    /// };
    /// assert!(rate_limited.is_retryable());
    ///
    /// let not_found = ApiError::Api {
    ///     status_code: 404,
    ///     message: "No such pet".to_string(),
    ///     request_id: None,
    /// };
    /// assert!(!not_found.is_retryable());
    ///
    /// assert!(ApiError::Timeout(Duration::from_secs(30)).is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(_) => true,
            ApiError::Api { status_code, .. } => *status_code == 429 || *status_code >= 500,
            ApiError::Timeout(_) => true,
            ApiError::Json(_)
            | ApiError::Io(_)
            | ApiError::InvalidInput(_)
            | ApiError::MalformedResponse(_)
            | ApiError::ClientBuild(_) => false,
        }
    }

    /// Returns the HTTP status code for [`ApiError::Api`], `None` otherwise.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}
