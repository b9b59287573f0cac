//! OS signal handling.
//!
//! SIGINT (and SIGTERM on unix) cancel the root [`CancelToken`], so an
//! in-flight transaction wait stops polling and the CLI exits cleanly.

use crate::lifecycle::CancelToken;

/// Spawn a task that cancels `token` on the first termination signal.
pub fn cancel_on_signal(token: CancelToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Termination signal received, cancelling pending waits");
        token.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to register SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
