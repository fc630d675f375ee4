use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::signal;

/// Resolves on Ctrl-C or SIGTERM and raises `cancelled` so open streams
/// and the capture loop wind down.
pub async fn wait_for_shutdown(cancelled: Arc<AtomicBool>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received");
    cancelled.store(true, Ordering::Relaxed);
}
