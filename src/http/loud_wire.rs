//! Wire-level debugging via the `LOUD_WIRE` environment variable.
//!
//! When `LOUD_WIRE` is set to any value, requests and responses are printed to
//! stderr with pretty-printed, colored JSON.
//!
//! ```bash
//! LOUD_WIRE=1 cargo test --test multipart_upload_tests
//! ```
//!
//! - Green `>>>` for outgoing requests
//! - Red `<<<` for incoming responses
//! - Yellow for multipart upload summaries
//!
//! Each line carries a timestamp and a request ID for correlation. Long string
//! values are truncated to keep output readable.

use crate::transfer::BodyFraming;
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

static ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if `LOUD_WIRE` debugging is enabled.
///
/// The result is cached after the first check, so `LOUD_WIRE` must be set
/// before the first request is made.
#[must_use]
pub(crate) fn is_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("LOUD_WIRE").is_ok())
}

/// Get the next request ID for correlation.
#[must_use]
pub(crate) fn next_request_id() -> usize {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// String values longer than this are truncated in JSON output.
const TRUNCATE_THRESHOLD: usize = 256;

/// Non-JSON bodies longer than this are truncated.
const RAW_BODY_LIMIT: usize = 1000;

/// Walks the JSON tree and truncates long string values.
fn truncate_long_strings(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::String(s) => {
            if s.len() > TRUNCATE_THRESHOLD {
                *s = super::error_helpers::truncate_for_context(s, TRUNCATE_THRESHOLD);
            }
        }
        serde_json::Value::Object(map) => {
            for val in map.values_mut() {
                truncate_long_strings(val);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                truncate_long_strings(item);
            }
        }
        _ => {}
    }
}

/// Renders a body for output: colored JSON when it parses, truncated text otherwise.
fn render_body(body: &str) -> String {
    if let Ok(mut parsed) = serde_json::from_str::<serde_json::Value>(body) {
        truncate_long_strings(&mut parsed);
        colored_json::to_colored_json_auto(&parsed)
            .ok()
            .or_else(|| serde_json::to_string_pretty(&parsed).ok())
            .unwrap_or_default()
    } else {
        super::error_helpers::truncate_for_context(body, RAW_BODY_LIMIT)
    }
}

/// Log prefix with timestamp and request ID.
fn prefix(request_id: usize) -> String {
    let ts = Utc::now()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
        .dimmed();
    format!(
        "{} {} {}",
        "[LOUD_WIRE]".bold(),
        ts,
        format!("[REQ#{}]", request_id).cyan()
    )
}

/// Log an outgoing HTTP request.
pub(crate) fn log_request(request_id: usize, method: &str, url: &str, body: Option<&str>) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = ">>>".green().bold();
    eprintln!("{prefix} {direction} {method} {url}");

    if let Some(body) = body {
        eprintln!("{prefix} {}:", "Body".green());
        for line in render_body(body).lines() {
            eprintln!("{prefix} {line}");
        }
    }
}

/// Log the start of a multipart upload.
pub(crate) fn log_upload_start(request_id: usize, url: &str, framing: BodyFraming, parts: usize) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = ">>>".green().bold();
    let summary = format!("multipart upload: {parts} part(s), framing={framing}").yellow();
    eprintln!("{prefix} {direction} POST {url}");
    eprintln!("{prefix} {summary}");
}

/// Log an incoming HTTP response status.
pub(crate) fn log_response_status(request_id: usize, status: u16) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = "<<<".red().bold();
    let status_text = if status < 300 {
        format!("{status} OK").green()
    } else {
        format!("{status} ERROR").red()
    };

    eprintln!("{prefix} {direction} {status_text}");
}

/// Log an incoming HTTP response body.
pub(crate) fn log_response_body(request_id: usize, body: &str) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    eprintln!("{prefix} {}:", "Response".red());
    for line in render_body(body).lines() {
        eprintln!("{prefix} {line}");
    }
}
