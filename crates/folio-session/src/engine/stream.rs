use folio_stream::ChatBackend;
use folio_types::QueryRequest;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use uuid::Uuid;

use super::command::Command;
use crate::update::FailureReason;

pub(crate) struct StreamFailure {
    pub reason: FailureReason,
    pub message: String,
}

impl StreamFailure {
    fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

/// Forward one response stream into the actor's queue
///
/// Returns once a terminal event has been forwarded. Transport errors, an
/// early end of stream and idle gaps longer than `idle_timeout` are
/// reported as failures.
pub(crate) async fn forward_stream(
    backend: Arc<dyn ChatBackend>,
    request: QueryRequest,
    idle_timeout: Duration,
    send_id: Uuid,
    commands: &mpsc::Sender<Command>,
) -> Result<(), StreamFailure> {
    let mut events = match timeout(idle_timeout, backend.stream_query(request)).await {
        Ok(Ok(events)) => events,
        Ok(Err(e)) => return Err(StreamFailure::new(FailureReason::Transport, e.to_string())),
        Err(_) => {
            return Err(StreamFailure::new(
                FailureReason::Timeout,
                format!("No response within {:?}", idle_timeout),
            ))
        }
    };

    loop {
        let event = match timeout(idle_timeout, events.next()).await {
            Ok(Some(Ok(event))) => event,
            Ok(Some(Err(e))) => {
                return Err(StreamFailure::new(FailureReason::Transport, e.to_string()))
            }
            Ok(None) => {
                return Err(StreamFailure::new(
                    FailureReason::Transport,
                    "Stream closed before the response completed",
                ))
            }
            Err(_) => {
                return Err(StreamFailure::new(
                    FailureReason::Timeout,
                    format!("No event within {:?}", idle_timeout),
                ))
            }
        };

        let terminal = event.is_terminal();
        if commands
            .send(Command::StreamEvent { send_id, event })
            .await
            .is_err()
        {
            tracing::debug!(%send_id, "Session closed while streaming");
            return Ok(());
        }
        if terminal {
            return Ok(());
        }
    }
}
