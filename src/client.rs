use crate::config::{self, ClientConfig};
use crate::errors::ApiError;
use crate::http::common::{construct_url, normalize_base_url};
use crate::http::error_helpers::{check_response, deserialize_with_context, map_transport_error};
use crate::http::loud_wire;
use crate::http::multipart::{FilePart, MultipartRequest};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// The main client for talking to a REST API.
///
/// Cloning is cheap: clones share the same connection pool and the same
/// [`ClientConfig`], including the chunked transfer switch.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) config: Arc<ClientConfig>,
    #[allow(clippy::struct_field_names)]
    pub(crate) http_client: ReqwestClient,
}

/// Builder for `Client` instances.
///
/// # Example
///
/// ```
/// use api_client::Client;
/// use std::time::Duration;
///
/// let client = Client::builder()
///     .base_url("https://petstore.example.com/v2")
///     .api_key("secret")
///     .timeout(Duration::from_secs(120))
///     .connect_timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// assert!(!client.is_chunked_transfer_enabled());
/// ```
pub struct ClientBuilder {
    base_url: String,
    api_key: Option<String>,
    api_key_header: String,
    user_agent: String,
    default_headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    chunk_size: usize,
    chunked_transfer: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: config::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_header: config::DEFAULT_API_KEY_HEADER.to_string(),
            user_agent: config::default_user_agent(),
            default_headers: Vec::new(),
            timeout: None,
            connect_timeout: None,
            chunk_size: config::DEFAULT_CHUNK_SIZE,
            chunked_transfer: false,
        }
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_header", &self.api_key_header)
            .field("user_agent", &self.user_agent)
            .field("default_headers", &self.default_headers)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("chunk_size", &self.chunk_size)
            .field("chunked_transfer", &self.chunked_transfer)
            .finish()
    }
}

impl ClientBuilder {
    /// Seeds the builder from the environment.
    ///
    /// Reads `API_CLIENT_BASE_URL` and `API_CLIENT_API_KEY` when set; anything
    /// unset keeps its default. Later setter calls override these values.
    #[must_use]
    pub fn from_env() -> Self {
        let mut builder = Self::default();
        if let Ok(base_url) = std::env::var(config::BASE_URL_ENV) {
            builder.base_url = base_url;
        }
        if let Ok(api_key) = std::env::var(config::API_KEY_ENV) {
            builder.api_key = Some(api_key);
        }
        builder
    }

    /// Sets the base URL every request path is appended to.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the API key sent with every request.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the header name that carries the API key. Defaults to `X-Api-Key`.
    #[must_use]
    pub fn api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header sent with every request. Validated in [`build`](Self::build).
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sets the total request timeout.
    ///
    /// This covers connecting, sending the request (including any streamed
    /// upload body) and receiving the response. Large uploads over slow links
    /// need a generous value.
    ///
    /// If not set, uses reqwest's default (no timeout).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// If not set, uses reqwest's default.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the read buffer size for streamed file parts. Must be non-zero.
    #[must_use]
    pub const fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Starts the client with chunked transfer encoding already enabled.
    #[must_use]
    pub const fn chunked_transfer(mut self) -> Self {
        self.chunked_transfer = true;
        self
    }

    /// Builds the `Client`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidInput`] if a default header, the API key header
    ///   name, the API key itself or the chunk size is invalid
    /// - [`ApiError::ClientBuild`] if the underlying HTTP client cannot be built
    pub fn build(self) -> Result<Client, ApiError> {
        if self.chunk_size == 0 {
            return Err(ApiError::InvalidInput(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        let api_key_header =
            HeaderName::from_bytes(self.api_key_header.as_bytes()).map_err(|e| {
                ApiError::InvalidInput(format!(
                    "Invalid API key header name '{}': {}",
                    self.api_key_header, e
                ))
            })?;

        // the key itself stays out of the message
        let api_key = self
            .api_key
            .as_deref()
            .map(|key| {
                HeaderValue::from_str(key).map(|mut value| {
                    value.set_sensitive(true);
                    value
                })
            })
            .transpose()
            .map_err(|_| {
                ApiError::InvalidInput(
                    "API key contains characters not allowed in a header value".to_string(),
                )
            })?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ApiError::InvalidInput(format!("Invalid header name '{name}': {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                ApiError::InvalidInput(format!("Invalid value for header '{name}': {e}"))
            })?;
            default_headers.append(header_name, header_value);
        }

        let mut builder = ReqwestClient::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        let config = ClientConfig {
            base_url: normalize_base_url(&self.base_url),
            api_key,
            api_key_header,
            user_agent: self.user_agent,
            default_headers,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            chunk_size: self.chunk_size,
            transfer: Default::default(),
        };

        if self.chunked_transfer {
            config.transfer.enable();
        }

        log::debug!(
            "Built client: base_url={}, framing={}",
            config.base_url,
            config.framing()
        );

        Ok(Client {
            config: Arc::new(config),
            http_client,
        })
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a new builder for `Client` instances.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Creates a client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Arc::new(ClientConfig::default()),
            http_client: ReqwestClient::new(),
        }
    }

    /// Returns the shared configuration of this client.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // --- Transfer mode ---

    /// Enables chunked transfer encoding for multipart uploads.
    ///
    /// Once enabled, multipart request bodies are streamed with
    /// `Transfer-Encoding: chunked` and no `Content-Length` header. While
    /// disabled (the default), file parameters are buffered in memory so a
    /// known `Content-Length` is sent.
    ///
    /// The setting is shared by every clone of this client and cannot be
    /// turned off again. Returns `self` for method chaining.
    ///
    /// # Example
    ///
    /// ```
    /// use api_client::Client;
    ///
    /// let client = Client::new();
    /// assert!(client.enable_chunked_transfer().is_chunked_transfer_enabled());
    /// ```
    pub fn enable_chunked_transfer(&self) -> &Self {
        self.config.transfer.enable();
        self
    }

    /// Returns whether chunked transfer encoding is enabled.
    #[must_use]
    pub fn is_chunked_transfer_enabled(&self) -> bool {
        self.config.transfer.is_enabled()
    }

    // --- Requests ---

    /// Starts a request with the API key, user agent and default headers applied.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, url)
            .headers(self.config.default_headers.clone())
            .header(USER_AGENT, &self.config.user_agent);

        if let Some(api_key) = &self.config.api_key {
            builder = builder.header(&self.config.api_key_header, api_key);
        }

        builder
    }

    async fn send(&self, request_id: usize, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout))?;

        loud_wire::log_response_status(request_id, response.status().as_u16());
        log::debug!("Response status: {}", response.status());

        check_response(response, self.config.timeout).await
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        request_id: usize,
        response: Response,
    ) -> Result<T, ApiError> {
        let response_text = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout))?;
        loud_wire::log_response_body(request_id, &response_text);
        deserialize_with_context(&response_text, std::any::type_name::<T>())
    }

    /// Sends a GET request and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP request fails or times out
    /// - The API returns a non-success status
    /// - The response body does not deserialize into `T`
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = construct_url(&self.config.base_url, path, query);
        log::debug!("GET {url}");

        let request_id = loud_wire::next_request_id();
        loud_wire::log_request(request_id, "GET", &url, None);

        let response = self.send(request_id, self.request(Method::GET, &url)).await?;
        self.read_json(request_id, response).await
    }

    /// Sends a POST request with a JSON body and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `body` cannot be serialized
    /// - The HTTP request fails or times out
    /// - The API returns a non-success status
    /// - The response body does not deserialize into `T`
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = construct_url(&self.config.base_url, path, &[]);
        let body = serde_json::to_string(body)?;
        log::debug!("POST {url}");
        log::debug!("Request Body (JSON):\n{body}");

        let request_id = loud_wire::next_request_id();
        loud_wire::log_request(request_id, "POST", &url, Some(&body));

        let builder = self
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let response = self.send(request_id, builder).await?;
        self.read_json(request_id, response).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the API returns a
    /// non-success status.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = construct_url(&self.config.base_url, path, &[]);
        log::debug!("DELETE {url}");

        let request_id = loud_wire::next_request_id();
        loud_wire::log_request(request_id, "DELETE", &url, None);

        self.send(request_id, self.request(Method::DELETE, &url))
            .await?;
        Ok(())
    }

    /// Sends a multipart POST request and deserializes the JSON response.
    ///
    /// The body is framed according to the chunked transfer switch, read once
    /// at the start of the call:
    ///
    /// - disabled: files are buffered and a `Content-Length` header is sent
    /// - enabled: every field is streamed with `Transfer-Encoding: chunked`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request has no parts, or a part has an invalid MIME type
    /// - A file parameter cannot be opened or read
    /// - The HTTP request fails or times out
    /// - The API returns a non-success status
    /// - The response body does not deserialize into `T`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use api_client::{Client, FilePart, MultipartRequest};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::builder()
    ///     .base_url("https://petstore.example.com/v2")
    ///     .build()?;
    /// client.enable_chunked_transfer();
    ///
    /// let request = MultipartRequest::new()
    ///     .text("additionalMetadata", "holiday photo")
    ///     .file(FilePart::path("file", "photo.jpg").mime_type("image/jpeg"));
    ///
    /// let response: serde_json::Value = client.upload("/pet/42/uploadImage", request).await?;
    /// println!("{response}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        request: MultipartRequest,
    ) -> Result<T, ApiError> {
        let url = construct_url(&self.config.base_url, path, &[]);
        let framing = self.config.framing();
        let parts = request.len();

        log::debug!(
            "POST {url} (multipart: {parts} part(s), {} file(s), framing={framing})",
            request.file_count()
        );

        let request_id = loud_wire::next_request_id();
        loud_wire::log_upload_start(request_id, &url, framing, parts);

        let form = request.into_form(framing, self.config.chunk_size).await?;
        let builder = self.request(Method::POST, &url).multipart(form);

        let response = self.send(request_id, builder).await?;
        self.read_json(request_id, response).await
    }

    /// Uploads a single file from disk as the multipart field `field_name`.
    ///
    /// # Errors
    ///
    /// Same as [`upload`](Self::upload).
    pub async fn upload_file<T: DeserializeOwned>(
        &self,
        path: &str,
        field_name: &str,
        file_path: impl AsRef<Path>,
    ) -> Result<T, ApiError> {
        let request = MultipartRequest::new().file(FilePart::path(field_name, file_path));
        self.upload(path, request).await
    }
}
