//! HTTP response building module
//!
//! Builders for the fixed responses the fixture emits. Every body is boxed so
//! in-memory and streamed responses share one type.

use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG};
use hyper::{Response, StatusCode};

/// Body type of every response the server produces
pub type ResponseBody = http_body_util::combinators::BoxBody<Bytes, std::io::Error>;

pub const TEXT_PLAIN: &str = "text/plain";
pub const ALLOWED_METHODS: &str = "GET, HEAD, PUT";

/// In-memory body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Zero-length body
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}

/// Plain-text response with an explicit length
pub fn build_text_response(status: StatusCode, text: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, text.len())
        .body(full(text))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// Plain-text response carrying the status' reason phrase
pub fn build_status_response(status: StatusCode) -> Response<ResponseBody> {
    build_text_response(status, status.canonical_reason().unwrap_or(""))
}

pub fn build_400_response() -> Response<ResponseBody> {
    build_status_response(StatusCode::BAD_REQUEST)
}

pub fn build_404_response() -> Response<ResponseBody> {
    build_status_response(StatusCode::NOT_FOUND)
}

pub fn build_413_response() -> Response<ResponseBody> {
    build_status_response(StatusCode::PAYLOAD_TOO_LARGE)
}

pub fn build_500_response() -> Response<ResponseBody> {
    build_status_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// 405 Method Not Allowed
pub fn build_405_response() -> Response<ResponseBody> {
    let status = StatusCode::METHOD_NOT_ALLOWED;
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(ALLOW, ALLOWED_METHODS)
        .body(full("Method Not Allowed"))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// 200 with an empty body
pub fn build_empty_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_LENGTH, 0)
        .body(empty())
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// JSON document response
pub fn build_json_response(value: &serde_json::Value) -> Response<ResponseBody> {
    let body = value.to_string();
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json; charset=utf-8")
        .header(CONTENT_LENGTH, body.len())
        .body(full(body))
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// 304 Not Modified
pub fn build_304_response(etag: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag)
        .body(empty())
        .unwrap_or_else(|e| fallback(StatusCode::NOT_MODIFIED, &e))
}

/// 416 Range Not Satisfiable
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    let status = StatusCode::RANGE_NOT_SATISFIABLE;
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .body(full("Range Not Satisfiable"))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// Degrade to a bare response when a header value fails to build
fn fallback(status: StatusCode, error: &hyper::http::Error) -> Response<ResponseBody> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut resp = Response::new(empty());
    *resp.status_mut() = status;
    resp
}
