//! # api-client-rs
//!
//! An async client for REST APIs: JSON requests plus multipart uploads with
//! file parameters.
//!
//! Multipart bodies can be framed two ways, selected by a switch shared by
//! every clone of a [`Client`]:
//!
//! - **Content-Length** (default): file parameters are buffered in memory so
//!   the total body length is known and sent up front.
//! - **Chunked**: after [`Client::enable_chunked_transfer`], file parameters
//!   are streamed from disk or from a reader and the body is sent with
//!   `Transfer-Encoding: chunked`.
//!
//! ```no_run
//! use api_client::{Client, FilePart, MultipartRequest};
//!
//! # async fn example() -> Result<(), api_client::ApiError> {
//! let client = Client::builder()
//!     .base_url("https://petstore.example.com/v2")
//!     .api_key("secret")
//!     .build()?;
//!
//! let pet: serde_json::Value = client.get_json("/pet/42", &[]).await?;
//! println!("{pet}");
//!
//! // Large files: stream instead of buffering
//! client.enable_chunked_transfer();
//! let request = MultipartRequest::new()
//!     .file(FilePart::path("file", "scan.tiff").mime_type("image/tiff"));
//! let _: serde_json::Value = client.upload("/pet/42/uploadImage", request).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Set `LOUD_WIRE=1` to print request and response traffic to stderr.

mod client;
mod config;
mod errors;
mod http;
mod transfer;

pub use client::{Client, ClientBuilder};
pub use config::{
    API_KEY_ENV, BASE_URL_ENV, ClientConfig, DEFAULT_API_KEY_HEADER, DEFAULT_BASE_URL,
    DEFAULT_CHUNK_SIZE, default_user_agent,
};
pub use errors::ApiError;
pub use http::multipart::{DEFAULT_MIME_TYPE, FilePart, MultipartRequest};
pub use transfer::{BodyFraming, TransferModeSwitch};
