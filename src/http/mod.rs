//! HTTP protocol layer module
//!
//! Response builders, byte ranges and cache validators, independent of the
//! upload/download handlers that use them.

pub mod cache;
pub mod range;
pub mod response;

// Re-export commonly used items
pub use range::{parse_range, ByteRange};
pub use response::{
    build_304_response, build_400_response, build_404_response, build_405_response,
    build_413_response, build_416_response, build_500_response, build_empty_response,
    build_json_response, build_status_response, build_text_response, empty, full, ResponseBody,
};
