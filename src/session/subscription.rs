//! Bridges adapter events into session state

use std::sync::{Arc, Weak};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::WalletSessionManager;
use crate::events::AdapterEvent;

/// Live listener for one adapter generation; dropping it stops the listener
#[derive(Debug)]
pub(crate) struct Subscription {
    generation: u64,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Start forwarding `events` to `session`
    ///
    /// `events` must be obtained before the adapter's readiness is read so
    /// that nothing emitted in between is lost.
    pub(crate) fn spawn(
        session: &Arc<WalletSessionManager>,
        generation: u64,
        mut events: broadcast::Receiver<AdapterEvent>,
    ) -> Self {
        let session: Weak<WalletSessionManager> = Arc::downgrade(session);
        let task = tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("Dropped {skipped} adapter events for generation {generation}");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let Some(session) = session.upgrade() else {
                    break;
                };
                session.apply_adapter_event(generation, event);
            }
            log::debug!("Adapter listener for generation {generation} finished");
        });

        Self { generation, task }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        log::trace!("Detaching adapter listener for generation {}", self.generation);
        self.task.abort();
    }
}
