use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `cancellation` once the process receives Ctrl-C. Returns early if something else
/// cancels it first.
pub async fn detect_shutdown(cancellation: CancellationToken) {
    select! {
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Received Ctrl-C"),
                Err(e) => error!("Failed to listen for Ctrl-C {e:?}"),
            }
            cancellation.cancel();
        },
        _ = cancellation.cancelled() => {},
    };
}
