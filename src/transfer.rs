//! Body framing switch for multipart uploads.
//!
//! A [`TransferModeSwitch`] decides how outgoing multipart request bodies are
//! framed on the wire:
//!
//! - **Disabled** (the default): file parts are buffered in memory so the total
//!   body length is known up front and a `Content-Length` header is sent.
//! - **Enabled**: file parts are streamed and the body is sent with
//!   `Transfer-Encoding: chunked`, without a `Content-Length` header.
//!
//! The switch lives in the client's shared [`ClientConfig`](crate::ClientConfig),
//! so every clone of a [`Client`](crate::Client) observes the same value.
//! Once enabled it stays enabled for the lifetime of that configuration.

use std::sync::atomic::{AtomicBool, Ordering};

/// How a multipart request body is framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFraming {
    /// Stream the body with chunked transfer encoding. No `Content-Length`.
    Chunked,
    /// Buffer the body and send a precomputed `Content-Length`.
    ContentLength,
}

impl BodyFraming {
    /// Returns `true` for [`BodyFraming::Chunked`].
    #[must_use]
    pub const fn is_chunked(self) -> bool {
        matches!(self, Self::Chunked)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Chunked => "chunked",
            Self::ContentLength => "content-length",
        }
    }
}

impl std::fmt::Display for BodyFraming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared on/off flag selecting chunked transfer encoding for multipart uploads.
///
/// Reads and writes go through an [`AtomicBool`], so any number of threads or
/// tasks may call [`enable`](Self::enable) and [`is_enabled`](Self::is_enabled)
/// concurrently without external locking. A write is visible to every reader
/// that loads the flag after the write returns.
///
/// There is no way to switch back: the only transition is
/// disabled to enabled.
///
/// # Example
///
/// ```
/// use api_client::{BodyFraming, TransferModeSwitch};
///
/// let switch = TransferModeSwitch::new();
/// assert!(!switch.is_enabled());
/// assert_eq!(switch.framing(), BodyFraming::ContentLength);
///
/// switch.enable().enable();
/// assert!(switch.is_enabled());
/// assert_eq!(switch.framing(), BodyFraming::Chunked);
/// ```
#[derive(Debug, Default)]
pub struct TransferModeSwitch {
    chunked_enabled: AtomicBool,
}

impl TransferModeSwitch {
    /// Creates a switch in the disabled state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chunked_enabled: AtomicBool::new(false),
        }
    }

    /// Enables chunked transfer encoding.
    ///
    /// Idempotent: calling this more than once has no further effect.
    /// Returns `&self` so calls can be chained.
    pub fn enable(&self) -> &Self {
        if !self.chunked_enabled.swap(true, Ordering::AcqRel) {
            log::debug!("Chunked transfer encoding enabled for multipart uploads");
        }
        self
    }

    /// Returns whether chunked transfer encoding is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.chunked_enabled.load(Ordering::Acquire)
    }

    /// Returns the body framing selected by the current value of the switch.
    #[must_use]
    pub fn framing(&self) -> BodyFraming {
        if self.is_enabled() {
            BodyFraming::Chunked
        } else {
            BodyFraming::ContentLength
        }
    }
}
