//! Download handler
//!
//! Serves files from the uploads directory, streamed straight from disk.

use futures_util::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};
use std::io::SeekFrom;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::handler::router::RequestContext;
use crate::http::{self, cache, ByteRange, ResponseBody};
use crate::logger;
use crate::store::{FileStore, StoreError};

/// Read buffer for regular (non-chunked) downloads
const STREAM_BUFFER: usize = 64 * 1024;

/// `GET`/`HEAD /<name>`
pub async fn serve(
    ctx: &RequestContext<'_>,
    store: &FileStore,
    chunk_size: usize,
) -> Response<ResponseBody> {
    let (mut file, metadata) = match store.open(ctx.name).await {
        Ok(opened) => opened,
        Err(StoreError::NotFound(_)) => return http::build_404_response(),
        Err(StoreError::InvalidName(name)) => {
            logger::log_warning(&format!("Rejected download name {name:?}"));
            return http::build_404_response();
        }
        Err(StoreError::Io(e)) => {
            logger::log_error(&format!("Failed to open '{}': {e}", ctx.name));
            return http::build_500_response();
        }
    };

    if ctx.chunked {
        return build_chunked_response(file, chunk_size.max(1), ctx.is_head);
    }

    let size = metadata.len();
    let etag = cache::etag_for(&metadata);
    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    let content_type = mime_guess::from_path(ctx.name)
        .first_or_octet_stream()
        .to_string();
    let mut builder = Response::builder()
        .header(CONTENT_TYPE, content_type)
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, &etag)
        .header(CACHE_CONTROL, "no-cache");
    if let Some(modified) = cache::last_modified(&metadata) {
        builder = builder.header(LAST_MODIFIED, modified);
    }

    let range = http::parse_range(ctx.range, size);
    let (builder, body) = match range {
        ByteRange::Unsatisfiable => return http::build_416_response(size),
        ByteRange::Partial { start, end } => {
            let builder = builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(CONTENT_RANGE, format!("bytes {start}-{end}/{size}"))
                .header(CONTENT_LENGTH, range.len());
            if ctx.is_head {
                (builder, http::empty())
            } else {
                if let Err(e) = file.seek(SeekFrom::Start(start)).await {
                    logger::log_error(&format!("Failed to seek '{}': {e}", ctx.name));
                    return http::build_500_response();
                }
                (builder, stream_body(file.take(range.len()), STREAM_BUFFER))
            }
        }
        ByteRange::Full => {
            let builder = builder
                .status(StatusCode::OK)
                .header(CONTENT_LENGTH, size);
            let body = if ctx.is_head {
                http::empty()
            } else {
                stream_body(file, STREAM_BUFFER)
            };
            (builder, body)
        }
    };

    builder.body(body).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to build download response: {e}"));
        http::build_500_response()
    })
}

/// Stream the file in `chunk_size` pieces without a length, forcing
/// `Transfer-Encoding: chunked`
fn build_chunked_response<R>(reader: R, chunk_size: usize, is_head: bool) -> Response<ResponseBody>
where
    R: AsyncRead + Send + Sync + 'static,
{
    let body = if is_head {
        http::empty()
    } else {
        stream_body(reader, chunk_size)
    };
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, http::response::TEXT_PLAIN)
        .body(body)
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build chunked response: {e}"));
            http::build_500_response()
        })
}

fn stream_body<R>(reader: R, chunk_size: usize) -> ResponseBody
where
    R: AsyncRead + Send + Sync + 'static,
{
    let frames = ReaderStream::with_capacity(reader, chunk_size).map_ok(Frame::data);
    StreamBody::new(frames).boxed()
}
