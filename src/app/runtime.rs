use super::types::SessionOutcome;
use crate::error::{GesturecamError, Result};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run a blocking session on the blocking pool while this runtime listens
/// for SIGINT and SIGTERM. A signal cancels the token the session polls.
pub async fn run_blocking_session<F>(session: F) -> Result<SessionOutcome>
where
    F: FnOnce(CancellationToken) -> Result<SessionOutcome> + Send + 'static,
{
    let cancellation_token = CancellationToken::new();
    let listeners = setup_signal_handlers(cancellation_token.clone());

    let session_token = cancellation_token.clone();
    let joined = tokio::task::spawn_blocking(move || session(session_token)).await;

    for listener in listeners {
        listener.abort();
    }

    joined.map_err(|e| GesturecamError::system(format!("Session thread failed: {}", e)))?
}

/// Set up signal handlers for graceful shutdown
fn setup_signal_handlers(token: CancellationToken) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    // Handle SIGTERM - Unix only
    #[cfg(unix)]
    {
        let token_sigterm = token.clone();
        handles.push(tokio::spawn(async move {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    if sigterm.recv().await.is_some() {
                        info!("Received SIGTERM signal");
                        token_sigterm.cancel();
                    }
                }
                Err(e) => warn!("Failed to register SIGTERM handler: {}", e),
            }
        }));
    }

    // Handle SIGINT (Ctrl+C) - Cross-platform
    handles.push(tokio::spawn(async move {
        if let Ok(()) = signal::ctrl_c().await {
            info!("Received SIGINT signal (Ctrl+C)");
            token.cancel();
        }
    }));

    handles
}
