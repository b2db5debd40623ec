use super::{NavRuntime, RuntimeError, RuntimeEvent};
use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::mpsc;

pub struct CliRuntime {
    event_tx: RwLock<mpsc::UnboundedSender<RuntimeEvent>>,
}

impl CliRuntime {
    pub fn new(event_tx: mpsc::UnboundedSender<RuntimeEvent>) -> Self {
        Self {
            event_tx: RwLock::new(event_tx),
        }
    }

    /// Replace the event sender (used when a new trip needs a fresh output loop)
    pub fn replace_event_tx(&self, new_tx: mpsc::UnboundedSender<RuntimeEvent>) {
        *self.event_tx.write() = new_tx;
    }
}

#[async_trait]
impl NavRuntime for CliRuntime {
    fn emit(&self, event: RuntimeEvent) -> Result<(), RuntimeError> {
        // Send to channel for CLI event handler to process
        self.event_tx
            .read()
            .send(event)
            .map_err(|_| RuntimeError::ReceiverClosed)?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), RuntimeError> {
        // No cleanup needed - channel drop handles it
        Ok(())
    }
}
