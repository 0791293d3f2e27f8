use tokio::signal;

/// Wait for a shutdown signal from the operating system.
///
/// Resolves on SIGINT (ctrl-c) everywhere and additionally on SIGTERM on
/// Unix, so the server drains in-flight requests before exiting when run
/// under a process supervisor.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}, using ctrl-c only", e);
                let _ = signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = signal::ctrl_c() => {
                tracing::info!("Received SIGINT, shutting down");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
        tracing::info!("Received ctrl-c, shutting down");
    }
}
