//! Multipart request bodies with text fields and file parameters.
//!
//! A [`MultipartRequest`] is turned into a `reqwest::multipart::Form` when it is
//! sent. How the fields are turned into form parts depends on the client's
//! [`BodyFraming`]:
//!
//! | Source  | `ContentLength`                   | `Chunked`                                  |
//! |---------|-----------------------------------|--------------------------------------------|
//! | path    | file read fully into memory       | file streamed in `chunk_size` reads        |
//! | bytes   | sent with their known length      | wrapped as a single-item stream            |
//! | reader  | drained into memory               | streamed in `chunk_size` reads             |
//! | text    | sent with its known length        | wrapped as a single-item stream            |
//!
//! With `ContentLength` every part has a known length, so reqwest computes the
//! total and sends a `Content-Length` header. With `Chunked` no part has a
//! known length, so the body goes out with `Transfer-Encoding: chunked`.

use crate::errors::ApiError;
use crate::transfer::BodyFraming;
use bytes::Bytes;
use reqwest::Body;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::ReaderStream;

/// MIME type used for file parts that don't declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

type BoxedReader = Box<dyn AsyncRead + Send + Sync + Unpin + 'static>;

enum FileSource {
    Path(PathBuf),
    Bytes(Bytes),
    Reader {
        reader: BoxedReader,
        length: Option<u64>,
    },
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Reader { length, .. } => {
                f.debug_struct("Reader").field("length", length).finish()
            }
        }
    }
}

/// A file parameter in a multipart request.
///
/// # Example
///
/// ```
/// use api_client::FilePart;
///
/// let avatar = FilePart::path("avatar", "/tmp/avatar.png").mime_type("image/png");
/// let notes = FilePart::bytes("notes", b"hello".to_vec()).file_name("notes.txt");
/// # let _ = (avatar, notes);
/// ```
#[derive(Debug)]
pub struct FilePart {
    name: String,
    source: FileSource,
    file_name: Option<String>,
    mime_type: Option<String>,
}

impl FilePart {
    /// A file parameter read from `path` when the request is sent.
    ///
    /// The file name defaults to the final component of `path`.
    #[must_use]
    pub fn path(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::with_source(name, FileSource::Path(path.as_ref().to_path_buf()))
    }

    /// A file parameter from in-memory bytes.
    #[must_use]
    pub fn bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::with_source(name, FileSource::Bytes(data.into()))
    }

    /// A file parameter drained from an async reader.
    ///
    /// `length`, when given, must equal the number of bytes the reader yields.
    /// It is checked when the part is buffered.
    #[must_use]
    pub fn reader<R>(name: impl Into<String>, reader: R, length: Option<u64>) -> Self
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        Self::with_source(
            name,
            FileSource::Reader {
                reader: Box::new(reader),
                length,
            },
        )
    }

    fn with_source(name: impl Into<String>, source: FileSource) -> Self {
        Self {
            name: name.into(),
            source,
            file_name: None,
            mime_type: None,
        }
    }

    /// Sets the file name sent in the part's `Content-Disposition`.
    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Sets the part's `Content-Type`. Defaults to [`DEFAULT_MIME_TYPE`].
    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// The form field name of this part.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file name that will be sent: the explicit one, else the path's
    /// final component, else the field name.
    #[must_use]
    pub fn resolved_file_name(&self) -> String {
        if let Some(file_name) = &self.file_name {
            return file_name.clone();
        }
        if let FileSource::Path(path) = &self.source
            && let Some(last) = path.file_name()
        {
            return last.to_string_lossy().into_owned();
        }
        self.name.clone()
    }

    async fn into_part(self, framing: BodyFraming, chunk_size: usize) -> Result<Part, ApiError> {
        let file_name = self.resolved_file_name();
        let mime_type = self
            .mime_type
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        let part = match (self.source, framing) {
            (FileSource::Path(path), BodyFraming::ContentLength) => {
                let data = tokio::fs::read(&path).await.map_err(|e| {
                    log::warn!("Failed to read file '{}': {}", path.display(), e);
                    ApiError::Io(e)
                })?;
                log::debug!(
                    "Buffered file part '{}': {} bytes from {}",
                    self.name,
                    data.len(),
                    path.display()
                );
                Part::bytes(data)
            }
            (FileSource::Path(path), BodyFraming::Chunked) => {
                let file = tokio::fs::File::open(&path).await.map_err(|e| {
                    log::warn!("Failed to open file '{}': {}", path.display(), e);
                    ApiError::Io(e)
                })?;
                log::debug!(
                    "Streaming file part '{}' from {} (chunk_size={} bytes)",
                    self.name,
                    path.display(),
                    chunk_size
                );
                Part::stream(Body::wrap_stream(ReaderStream::with_capacity(
                    file, chunk_size,
                )))
            }
            (FileSource::Bytes(data), BodyFraming::ContentLength) => {
                let length = data.len() as u64;
                Part::stream_with_length(Body::from(data), length)
            }
            (FileSource::Bytes(data), BodyFraming::Chunked) => Part::stream(single_chunk(data)),
            (FileSource::Reader { mut reader, length }, BodyFraming::ContentLength) => {
                let capacity = length
                    .and_then(|len| usize::try_from(len).ok())
                    .map_or(0, |len| len.min(chunk_size));
                let mut data = Vec::with_capacity(capacity);
                reader.read_to_end(&mut data).await?;
                if let Some(expected) = length
                    && expected != data.len() as u64
                {
                    return Err(ApiError::InvalidInput(format!(
                        "File part '{}' declared {} bytes but the reader yielded {}",
                        self.name,
                        expected,
                        data.len()
                    )));
                }
                Part::bytes(data)
            }
            (FileSource::Reader { reader, .. }, BodyFraming::Chunked) => Part::stream(
                Body::wrap_stream(ReaderStream::with_capacity(reader, chunk_size)),
            ),
        };

        part.file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|e| ApiError::InvalidInput(format!("Invalid MIME type '{mime_type}': {e}")))
    }
}

/// A body of one chunk with no declared length.
fn single_chunk(data: Bytes) -> Body {
    let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(data) });
    Body::wrap_stream(stream)
}

#[derive(Debug)]
enum FormField {
    Text { name: String, value: String },
    File(FilePart),
}

/// An ordered set of multipart form fields.
///
/// # Example
///
/// ```
/// use api_client::{FilePart, MultipartRequest};
///
/// let request = MultipartRequest::new()
///     .text("additionalMetadata", "profile photo")
///     .file(FilePart::bytes("file", b"\x89PNG".to_vec()).mime_type("image/png"));
/// assert_eq!(request.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MultipartRequest {
    fields: Vec<FormField>,
}

impl MultipartRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Adds a file parameter.
    #[must_use]
    pub fn file(mut self, part: FilePart) -> Self {
        self.fields.push(FormField::File(part));
        self
    }

    /// Number of fields, text and file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of file parameters.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| matches!(field, FormField::File(_)))
            .count()
    }

    /// Builds the reqwest form using `framing` for every field.
    pub(crate) async fn into_form(
        self,
        framing: BodyFraming,
        chunk_size: usize,
    ) -> Result<Form, ApiError> {
        if self.fields.is_empty() {
            return Err(ApiError::InvalidInput(
                "Multipart request has no parts".to_string(),
            ));
        }

        let mut form = Form::new();
        for field in self.fields {
            form = match field {
                FormField::Text { name, value } => match framing {
                    BodyFraming::ContentLength => form.text(name, value),
                    BodyFraming::Chunked => {
                        form.part(name, Part::stream(single_chunk(Bytes::from(value))))
                    }
                },
                FormField::File(file) => {
                    let name = file.name.clone();
                    let part = file.into_part(framing, chunk_size).await?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}
