//! Validators for conditional downloads
//!
//! The entity tag is derived from file metadata (size and modification
//! time) so a file never has to be read just to answer `If-None-Match`.

use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::time::{SystemTime, UNIX_EPOCH};

/// Strong `ETag` of the form `"<size hex>-<mtime millis hex>"`
pub fn etag_for(metadata: &Metadata) -> String {
    let mtime_ms = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_millis());
    format!("\"{:x}-{:x}\"", metadata.len(), mtime_ms)
}

/// `Last-Modified` value in IMF-fixdate form
pub fn last_modified(metadata: &Metadata) -> Option<String> {
    metadata.modified().ok().map(http_date)
}

pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Whether the client's `If-None-Match` already names this `ETag`
///
/// Handles lists (`"a", "b"`), weak tags (`W/"a"`) and `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.trim_start_matches("W/") == etag
        })
    })
}
