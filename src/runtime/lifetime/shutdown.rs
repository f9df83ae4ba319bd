use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::analytics::ClickRecorder;
use crate::storage::SeaOrmStorage;

/// Upper bound for draining queued clicks
const RECORDER_DRAIN_TIMEOUT_SECS: u64 = 10;

/// Resolve on Ctrl+C. A broken signal handler counts as a shutdown request.
pub async fn wait_for_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }
}

/// Drain the click recorder, then close the connection pool.
pub async fn perform_shutdown_tasks(recorder: &ClickRecorder, storage: &Arc<SeaOrmStorage>) {
    match timeout(
        Duration::from_secs(RECORDER_DRAIN_TIMEOUT_SECS),
        recorder.shutdown(),
    )
    .await
    {
        Ok(()) => info!("ClickRecorder drained"),
        Err(_) => error!(
            "ClickRecorder drain timed out after {} seconds, remaining clicks are lost",
            RECORDER_DRAIN_TIMEOUT_SECS
        ),
    }

    storage.as_ref().clone().close().await;
    info!("Database connection closed");
}
