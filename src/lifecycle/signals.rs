//! OS signal handling.
//!
//! # Responsibilities
//! - Resolve when the process is asked to stop (SIGINT, SIGTERM)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Callers race this against the watch; dropping the watch releases its
//!   subscription

/// Wait for Ctrl-C, or SIGTERM on Unix.
pub async fn interrupted() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
