//! Retraining notification sink.
//!
//! The workflow core emits a fire-and-forget event after each committed
//! label or skip; the model-retraining pipeline is an external consumer
//! of the receiving end. The core never blocks on or inspects the
//! outcome.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One committed label/skip notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrainEvent {
    /// Project the committed submission belongs to.
    pub project_id: String,
    /// Item the submission was for.
    pub item_id: String,
}

/// Cloneable handle used by the coordinator to emit retrain events.
#[derive(Clone)]
pub struct RetrainTrigger {
    tx: Option<mpsc::UnboundedSender<RetrainEvent>>,
}

impl RetrainTrigger {
    /// Create a trigger and the receiver the retraining consumer reads.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RetrainEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Create a trigger that drops every event. Used when no retraining
    /// consumer is wired up (tests, offline tooling).
    #[must_use]
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emit a notification. Non-blocking, at-least-once; a closed
    /// channel is logged and otherwise ignored.
    pub fn notify(&self, project_id: &str, item_id: &str) {
        let Some(ref tx) = self.tx else {
            return;
        };
        let event = RetrainEvent {
            project_id: project_id.to_owned(),
            item_id: item_id.to_owned(),
        };
        if tx.send(event).is_err() {
            warn!(project_id, item_id, "retrain consumer gone, dropping event");
        }
    }
}

/// Spawn a listener that logs retrain events until cancelled.
///
/// Stands in for the external retraining pipeline when the binary runs
/// without one attached.
pub fn spawn_logging_listener(
    mut rx: mpsc::UnboundedReceiver<RetrainEvent>,
    ct: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = ct.cancelled() => break,
                event = rx.recv() => {
                    match event {
                        Some(event) => {
                            debug!(
                                project_id = %event.project_id,
                                item_id = %event.item_id,
                                "retrain check requested"
                            );
                        }
                        None => break,
                    }
                }
            }
        }
    })
}
