//! Shared configuration context for a [`Client`](crate::Client).
//!
//! A `ClientConfig` is built once by [`ClientBuilder`](crate::ClientBuilder) and
//! then shared through an `Arc` by every clone of the client. Apart from the
//! [`TransferModeSwitch`], all fields are fixed after construction.

use crate::transfer::{BodyFraming, TransferModeSwitch};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost";

/// Header carrying the API key when none is configured.
pub const DEFAULT_API_KEY_HEADER: &str = "X-Api-Key";

/// Default read buffer size for streamed file parts (8 MB).
///
/// A chunked upload holds roughly this many bytes in memory at a time,
/// whatever the size of the file.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Environment variable read by [`ClientBuilder::from_env`](crate::ClientBuilder::from_env) for the base URL.
pub const BASE_URL_ENV: &str = "API_CLIENT_BASE_URL";

/// Environment variable read by [`ClientBuilder::from_env`](crate::ClientBuilder::from_env) for the API key.
pub const API_KEY_ENV: &str = "API_CLIENT_API_KEY";

/// Returns the `User-Agent` sent when none is configured.
#[must_use]
pub fn default_user_agent() -> String {
    format!("api-client-rs/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration shared by all handles of one client.
pub struct ClientConfig {
    pub(crate) base_url: String,
    pub(crate) api_key: Option<HeaderValue>,
    pub(crate) api_key_header: HeaderName,
    pub(crate) user_agent: String,
    pub(crate) default_headers: HeaderMap,
    pub(crate) timeout: Option<Duration>,
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) chunk_size: usize,
    pub(crate) transfer: TransferModeSwitch,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_header: HeaderName::from_static("x-api-key"),
            user_agent: default_user_agent(),
            default_headers: HeaderMap::new(),
            timeout: None,
            connect_timeout: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            transfer: TransferModeSwitch::new(),
        }
    }
}

impl ClientConfig {
    /// Base URL every request path is appended to. Never ends with `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns `true` if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Name of the header that carries the API key, lowercased.
    #[must_use]
    pub fn api_key_header(&self) -> &str {
        self.api_key_header.as_str()
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Headers added to every request.
    #[must_use]
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Read buffer size for streamed file parts.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The switch selecting multipart body framing.
    #[must_use]
    pub fn transfer(&self) -> &TransferModeSwitch {
        &self.transfer
    }

    /// Shortcut for `self.transfer().framing()`.
    #[must_use]
    pub fn framing(&self) -> BodyFraming {
        self.transfer.framing()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_header", &self.api_key_header)
            .field("user_agent", &self.user_agent)
            .field("default_headers", &self.default_headers)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("chunk_size", &self.chunk_size)
            .field("chunked_transfer", &self.transfer.is_enabled())
            .finish()
    }
}
