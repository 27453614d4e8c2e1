//! HTTP layer: URL construction, response checking, wire debugging and
//! multipart body building.
//!
//! Only the multipart types are re-exported from the crate root; the rest is
//! implementation detail.

pub(crate) mod common;
pub(crate) mod error_helpers;
pub(crate) mod loud_wire;
pub mod multipart;
