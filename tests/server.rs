//! Drives the fixture over a real TCP connection.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use upload_fixture::config::{AppState, Config, Overrides};
use upload_fixture::server;

struct RunningFixture {
    addr: SocketAddr,
    uploads: tempfile::TempDir,
    stop: Option<oneshot::Sender<()>>,
}

impl RunningFixture {
    async fn start() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let mut config = Config::load_from("does-not-exist", &Overrides::default()).unwrap();
        config.server.port = 0;
        config.storage.uploads_dir = uploads.path().to_path_buf();
        config.logging.access_log = false;

        let listener = server::create_listener(config.get_socket_addr().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(&config));

        let (stop, stopped) = oneshot::channel::<()>();
        tokio::spawn(server::serve(listener, state, async move {
            let _ = stopped.await;
            "test finished"
        }));

        Self {
            addr,
            uploads,
            stop: Some(stop),
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: &[u8],
    ) -> (StatusCode, hyper::HeaderMap, Vec<u8>) {
        let stream = TcpStream::connect(self.addr).await.unwrap();
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
        tokio::spawn(conn);

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("host", self.addr.to_string())
            .header("x-upload-client", "integration")
            .body(Full::new(Bytes::copy_from_slice(body)))
            .unwrap();
        let resp = sender.send_request(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes.to_vec())
    }
}

impl Drop for RunningFixture {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

#[tokio::test]
async fn put_then_get_over_tcp() {
    let fixture = RunningFixture::start().await;

    let (status, headers, body) = fixture.request(Method::PUT, "/hello.txt", b"hi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "text/plain");
    assert_eq!(body, b"OK!");
    assert_eq!(
        std::fs::read(fixture.uploads.path().join("hello.txt")).unwrap(),
        b"hi"
    );

    let (status, _, body) = fixture.request(Method::GET, "/hello.txt", b"").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"hi");
}

#[tokio::test]
async fn missing_file_is_404_over_tcp() {
    let fixture = RunningFixture::start().await;
    let (status, _, _) = fixture.request(Method::GET, "/missing.txt", b"").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chunked_download_uses_transfer_encoding() {
    let fixture = RunningFixture::start().await;
    let content = vec![b'z'; 5000];
    fixture.request(Method::PUT, "/big.txt", &content).await;

    let (status, headers, body) = fixture.request(Method::GET, "/big.txt?chunked=1", b"").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["transfer-encoding"], "chunked");
    assert!(headers.get("content-length").is_none());
    assert_eq!(body, content);
}

#[tokio::test]
async fn last_put_headers_are_echoed() {
    let fixture = RunningFixture::start().await;
    fixture.request(Method::PUT, "/h.txt", b"abc").await;

    let (status, _, body) = fixture.request(Method::GET, "/last_put_headers", b"").await;
    assert_eq!(status, StatusCode::OK);
    let headers: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(headers["x-upload-client"], "integration");
    assert_eq!(headers["content-length"], "3");
}
