//! Upload handler
//!
//! `PUT /<name>` stores the raw request body under the uploads directory.
//! `PUT /` is accepted but inert.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::HeaderMap;
use hyper::{Request, Response, StatusCode};

use crate::config::{AppState, HeaderSnapshot};
use crate::http::{self, ResponseBody};
use crate::logger;
use crate::store::StoreError;

/// Body returned after a successful write
pub const UPLOAD_OK: &str = "OK!";

/// `PUT /<name>`
pub async fn handle<B>(req: Request<B>, state: &AppState, name: &str) -> Response<ResponseBody>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let snapshot = snapshot_headers(req.headers());
    *state.last_put_headers.write().await = snapshot;

    // `PUT /` drains whatever it is sent, uncapped
    let inert = name.trim_start_matches('/').is_empty();
    let limit = if inert { None } else { state.config.http.max_body_size };

    if let Some(max_body_size) = limit {
        if declared_length(req.headers()).is_some_and(|len| len > max_body_size) {
            logger::log_error(&format!(
                "Upload '{name}' too large by Content-Length (max: {max_body_size})"
            ));
            return http::build_413_response();
        }
    }

    let data = match read_body(req.into_body(), limit).await {
        Ok(data) => data,
        Err(BodyError::TooLarge(max_body_size)) => {
            logger::log_error(&format!(
                "Upload '{name}' exceeded {max_body_size} bytes while streaming"
            ));
            return http::build_413_response();
        }
        Err(BodyError::Read(e)) => {
            logger::log_warning(&format!("Failed to read upload body for '{name}': {e}"));
            return http::build_400_response();
        }
    };

    if inert {
        logger::log_debug(&format!("Ignoring {} byte PUT without a file name", data.len()));
        return http::build_empty_response();
    }

    match state.store.put(name, &data).await {
        Ok(written) => {
            logger::log_debug(&format!("Stored {written} bytes as '{name}'"));
            http::build_text_response(StatusCode::OK, UPLOAD_OK)
        }
        Err(StoreError::InvalidName(name)) => {
            logger::log_warning(&format!("Rejected upload name {name:?}"));
            http::build_400_response()
        }
        Err(e) => {
            logger::log_error(&format!("Failed to store '{name}': {e}"));
            http::build_500_response()
        }
    }
}

enum BodyError {
    TooLarge(u64),
    Read(Box<dyn std::error::Error + Send + Sync>),
}

/// Collect the whole body, stopping once it passes `limit` bytes if one is set
async fn read_body<B>(body: B, limit: Option<u64>) -> Result<Bytes, BodyError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let collected = match limit {
        Some(limit) => {
            let cap = usize::try_from(limit).unwrap_or(usize::MAX);
            match Limited::new(body, cap).collect().await {
                Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                    return Err(BodyError::TooLarge(limit));
                }
                other => other,
            }
        }
        None => body.collect().await.map_err(Into::into),
    };

    collected
        .map(|c| c.to_bytes())
        .map_err(BodyError::Read)
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(hyper::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Lower-case header names; repeated headers joined with `", "`
pub fn snapshot_headers(headers: &HeaderMap) -> HeaderSnapshot {
    let mut snapshot = HeaderSnapshot::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        snapshot
            .entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    snapshot
}
