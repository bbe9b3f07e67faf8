//! Background worker that folds log events into the status service
//!
//! The log reader is the only producer and this worker the only consumer, so
//! events reach the aggregate in the order their lines appear in the log.

use tokio::sync::mpsc;

use crate::application::services::StatusService;
use crate::domain::events::LogEvent;

/// Apply events until every sender has been dropped. Returns the number of
/// events that were rejected by the aggregate.
pub async fn ingest_worker(mut events: mpsc::Receiver<LogEvent>, status: StatusService) -> u64 {
    tracing::info!("Starting log ingest worker");
    let mut rejected = 0;

    while let Some(event) = events.recv().await {
        let event_type = event.event_type;
        let name = event.name.clone();
        if let Err(e) = status.apply(event).await {
            // Usually a character line that no handshake could be matched to
            rejected += 1;
            tracing::warn!(event = %event_type, name = %name, "Dropped log event: {}", e);
        }
    }

    tracing::info!(rejected, "Log event channel closed, ingest worker stopping");
    rejected
}
