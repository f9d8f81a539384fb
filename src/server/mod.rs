// Server module entry point
// Listener setup, the accept loop and per-connection tasks

pub mod connection;
pub mod listener;
pub mod signal;

pub use listener::create_listener;
pub use signal::shutdown_signal;

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

/// Accept connections until `shutdown` resolves.
///
/// Connections already being served keep running on their own tasks.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = &'static str>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => match accept_result {
                Ok((stream, peer_addr)) => {
                    connection::accept_connection(stream, peer_addr, &state, &active_connections);
                }
                Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
            },
            reason = &mut shutdown => {
                logger::log_shutdown(reason);
                break;
            }
        }
    }
}
