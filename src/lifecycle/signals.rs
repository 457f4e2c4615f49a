//! OS signal handling.

use crate::lifecycle::shutdown::Shutdown;

/// Trigger the shutdown coordinator when ctrl-c arrives.
pub async fn shutdown_on_ctrl_c(shutdown: Shutdown) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
        return;
    }
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
