//! Helper routes for client test suites
//!
//! These shadow uploaded files of the same name.

use hyper::{Response, StatusCode};

use crate::config::AppState;
use crate::http::{self, ResponseBody};

pub const LAST_PUT_HEADERS_PATH: &str = "/last_put_headers";

/// Answer a helper route, or `None` to fall through to file serving
pub async fn route(path: &str, state: &AppState) -> Option<Response<ResponseBody>> {
    match path {
        LAST_PUT_HEADERS_PATH => {
            let headers = state.last_put_headers.read().await;
            let value = serde_json::to_value(&*headers).unwrap_or_default();
            Some(http::build_json_response(&value))
        }
        "/get/500" => Some(http::build_text_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "KO: 500",
        )),
        "/get/400" => Some(http::build_text_response(StatusCode::BAD_REQUEST, "KO: 400")),
        _ => None,
    }
}
