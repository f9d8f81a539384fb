//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: artificial latency, method
//! dispatch, access logging.

use hyper::body::Body;
use hyper::header::{HeaderName, CONTENT_LENGTH, IF_NONE_MATCH, RANGE, SERVER, USER_AGENT};
use hyper::http::HeaderValue;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppState;
use crate::handler::{download, fixtures, upload};
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};

/// What the download handler needs from a GET/HEAD request
pub struct RequestContext<'a> {
    /// Decoded path, leading slash included
    pub name: &'a str,
    pub is_head: bool,
    /// `?chunked=<non-empty>` was given
    pub chunked: bool,
    pub if_none_match: Option<&'a str>,
    pub range: Option<&'a str>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = state.config.logging.access_log.then(|| access_entry(&req, remote_addr));

    let latency = state.config.fixture.latency_ms;
    if latency > 0 && req.method() != Method::PUT {
        tokio::time::sleep(Duration::from_millis(latency)).await;
    }

    let mut response = route_request(req, &state).await;

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch by method and path
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<ResponseBody>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let Ok(path) = urlencoding::decode(req.uri().path()).map(|p| p.into_owned()) else {
        logger::log_warning(&format!("Undecodable request path: {}", req.uri().path()));
        return http::build_400_response();
    };

    let method = req.method().clone();
    match method {
        Method::GET | Method::HEAD => {
            if let Some(resp) = fixtures::route(&path, state).await {
                return resp;
            }

            // Owned so no borrow of the request is held across the file read
            let if_none_match = header_string(&req, IF_NONE_MATCH);
            let range = header_string(&req, RANGE);
            let ctx = RequestContext {
                name: &path,
                is_head: method == Method::HEAD,
                chunked: wants_chunked(req.uri().query()),
                if_none_match: if_none_match.as_deref(),
                range: range.as_deref(),
            };
            download::serve(&ctx, &state.store, state.config.fixture.chunk_size).await
        }
        Method::PUT => upload::handle(req, state, &path).await,
        other => {
            logger::log_warning(&format!("Method not allowed: {other}"));
            http::build_405_response()
        }
    }
}

fn header_string<B>(req: &Request<B>, name: HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// `chunked` query parameter with a non-empty value
fn wants_chunked(query: Option<&str>) -> bool {
    query.is_some_and(|q| {
        q.split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == "chunked" && !value.is_empty())
    })
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry.request_bytes = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Overrides};
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use hyper::StatusCode;

    struct Harness {
        dir: tempfile::TempDir,
        state: Arc<AppState>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with(|_| {})
        }

        fn with(tweak: impl FnOnce(&mut Config)) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut config = Config::load_from("does-not-exist", &Overrides::default()).unwrap();
            config.storage.uploads_dir = dir.path().to_path_buf();
            config.logging.access_log = false;
            tweak(&mut config);
            let state = Arc::new(AppState::new(&config));
            Self { dir, state }
        }

        async fn send(&self, method: Method, uri: &str, body: &[u8]) -> (StatusCode, Vec<u8>) {
            let req = Request::builder()
                .method(method)
                .uri(uri)
                .body(Full::new(Bytes::copy_from_slice(body)))
                .unwrap();
            let addr: SocketAddr = "127.0.0.1:40000".parse().unwrap();
            let resp = handle_request(req, Arc::clone(&self.state), addr)
                .await
                .unwrap();
            let status = resp.status();
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            (status, bytes.to_vec())
        }
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let h = Harness::new();
        let (status, body) = h.send(Method::PUT, "/hello.txt", b"hi").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK!");

        let (status, body) = h.send(Method::GET, "/hello.txt", b"").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"hi");
    }

    #[tokio::test]
    async fn test_round_trip_binary_content() {
        let h = Harness::new();
        let content: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        h.send(Method::PUT, "/data.bin", &content).await;

        let (status, body) = h.send(Method::GET, "/data.bin", b"").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, content);
    }

    #[tokio::test]
    async fn test_second_put_overwrites() {
        let h = Harness::new();
        h.send(Method::PUT, "/f", b"first and longer").await;
        h.send(Method::PUT, "/f", b"second").await;

        let (_, body) = h.send(Method::GET, "/f", b"").await;
        assert_eq!(body, b"second");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let h = Harness::new();
        let (status, _) = h.send(Method::GET, "/missing.txt", b"").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = h.send(Method::GET, "/", b"").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_inert_put_root() {
        let h = Harness::new();
        let (status, body) = h.send(Method::PUT, "/", b"payload").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(std::fs::read_dir(h.dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_percent_encoded_names() {
        let h = Harness::new();
        h.send(Method::PUT, "/with%20space.txt", b"spaced").await;
        assert!(h.dir.path().join("with space.txt").exists());

        let (status, _) = h.send(Method::GET, "/%2e%2e/etc/passwd", b"").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = h.send(Method::GET, "/a%00b.txt", b"").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = h.send(Method::PUT, "/a%00b.txt", b"x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_nested_names_need_parent_dirs() {
        let h = Harness::new();
        let (status, _) = h.send(Method::PUT, "/a/b/c.txt", b"x").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let h = Harness::with(|c| c.storage.create_parent_dirs = true);
        let (status, _) = h.send(Method::PUT, "/a/b/c.txt", b"x").await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = h.send(Method::GET, "/a/b/c.txt", b"").await;
        assert_eq!(body, b"x");
    }

    #[tokio::test]
    async fn test_other_methods_are_405() {
        let h = Harness::new();
        let (status, _) = h.send(Method::DELETE, "/hello.txt", b"").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        let (status, _) = h.send(Method::POST, "/hello.txt", b"x").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_last_put_headers_route() {
        let h = Harness::new();
        h.send(Method::PUT, "/hello.txt", b"hi").await;

        let (status, body) = h.send(Method::GET, "/last_put_headers", b"").await;
        assert_eq!(status, StatusCode::OK);
        let headers: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(headers.is_object());
    }

    #[tokio::test]
    async fn test_latency_skips_put() {
        let h = Harness::with(|c| c.fixture.latency_ms = 150);

        let started = Instant::now();
        h.send(Method::PUT, "/slow.txt", b"x").await;
        assert!(started.elapsed() < Duration::from_millis(150));

        let started = Instant::now();
        h.send(Method::GET, "/slow.txt", b"").await;
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn test_wants_chunked() {
        assert!(wants_chunked(Some("chunked=1")));
        assert!(wants_chunked(Some("a=b&chunked=true")));
        assert!(!wants_chunked(Some("chunked=")));
        assert!(!wants_chunked(Some("chunked")));
        assert!(!wants_chunked(None));
    }
}
