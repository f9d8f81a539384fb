// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub fixture: FixtureConfig,
}

/// Listen address and runtime sizing
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Where uploaded files live
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root for every served or stored file
    pub uploads_dir: PathBuf,
    /// Create missing parent directories before writing an upload
    #[serde(default)]
    pub create_parent_dirs: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Connection handling limits
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Upper bound for the lifetime of one connection, in seconds
    pub connection_timeout: u64,
    pub keep_alive: bool,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Upload body cap in bytes; unset means no limit
    pub max_body_size: Option<u64>,
}

/// Knobs client test suites use to shape the fixture's behaviour
#[derive(Debug, Deserialize, Clone)]
pub struct FixtureConfig {
    /// Delay applied to every non-PUT request
    pub latency_ms: u64,
    /// Piece size for `?chunked` downloads
    pub chunk_size: usize,
}
