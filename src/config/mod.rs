// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::{AppState, HeaderSnapshot};
pub use types::{
    Config, FixtureConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    StorageConfig,
};

/// Values given on the command line, applied on top of file and environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub port: Option<u16>,
    pub uploads_dir: Option<String>,
    pub latency_ms: Option<u64>,
}

impl Config {
    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error; defaults and environment still apply
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("storage.uploads_dir", "uploads")?
            .set_default("storage.create_parent_dirs", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.connection_timeout", 300)?
            .set_default("performance.keep_alive", true)?
            .set_default("http.server_name", "upload-fixture")?
            .set_default("fixture.latency_ms", 0)?
            .set_default("fixture.chunk_size", 1024)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("FIXTURE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("storage.uploads_dir", overrides.uploads_dir.clone())?
            .set_override_option(
                "fixture.latency_ms",
                overrides.latency_ms.and_then(|ms| i64::try_from(ms).ok()),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::load_from("does-not-exist", &Overrides::default()).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.storage.uploads_dir.to_str(), Some("uploads"));
        assert!(!cfg.storage.create_parent_dirs);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.fixture.latency_ms, 0);
        assert_eq!(cfg.fixture.chunk_size, 1024);
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:5000".parse().unwrap()
        );
    }

    #[test]
    fn test_cli_overrides_win() {
        let overrides = Overrides {
            port: Some(3333),
            uploads_dir: Some("/tmp/fixture-uploads".to_string()),
            latency_ms: Some(250),
        };
        let cfg = Config::load_from("does-not-exist", &overrides).unwrap();
        assert_eq!(cfg.server.port, 3333);
        assert_eq!(cfg.storage.uploads_dir.to_str(), Some("/tmp/fixture-uploads"));
        assert_eq!(cfg.fixture.latency_ms, 250);
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.toml");
        std::fs::write(
            &path,
            "[storage]\nuploads_dir = \"data\"\ncreate_parent_dirs = true\n\n[fixture]\nlatency_ms = 10\n",
        )
        .unwrap();

        let base = dir.path().join("fixture");
        let cfg = Config::load_from(base.to_str().unwrap(), &Overrides::default()).unwrap();
        assert_eq!(cfg.storage.uploads_dir.to_str(), Some("data"));
        assert!(cfg.storage.create_parent_dirs);
        assert_eq!(cfg.fixture.latency_ms, 10);
        // Untouched sections keep their defaults
        assert_eq!(cfg.server.port, 5000);
    }
}
