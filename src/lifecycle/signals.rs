//! OS signal handling.

use std::sync::Arc;

use crate::lifecycle::Shutdown;

/// Spawn a task that triggers `shutdown` on Ctrl-C.
pub fn spawn_ctrl_c_handler(shutdown: Arc<Shutdown>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        tracing::info!("Interrupt received, cancelling watches");
        shutdown.trigger();
    });
}
