use clap::Parser;
use std::sync::Arc;

use upload_fixture::config::{self, Overrides};
use upload_fixture::{logger, server};

#[derive(Parser, Debug)]
#[command(name = "upload-fixture")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (without extension)
    #[arg(short, long, env = "FIXTURE_CONFIG", default_value = "fixture")]
    config: String,

    /// Extra latency in milliseconds for every non-PUT request
    #[arg(long)]
    latency: Option<u64>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory uploads are stored in and served from
    #[arg(long)]
    uploads_dir: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let overrides = Overrides {
        port: args.port,
        uploads_dir: args.uploads_dir,
        latency_ms: args.latency,
    };
    let cfg = config::Config::load_from(&args.config, &overrides)?;

    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    let state = Arc::new(config::AppState::new(&cfg));

    logger::log_server_start(&listener.local_addr()?, &cfg);
    if !cfg.storage.create_parent_dirs && !state.store.root().is_dir() {
        logger::log_warning(&format!(
            "Uploads directory {} does not exist; uploads will fail until it is created",
            state.store.root().display()
        ));
    }

    server::serve(listener, state, server::shutdown_signal()).await;
    Ok(())
}
