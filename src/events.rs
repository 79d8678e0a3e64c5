//! Named events emitted by wallet adapters

use tokio::sync::broadcast;

use crate::error::WalletError;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Asynchronous notifications an adapter pushes to its listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    /// The wallet finished connecting; `public_key` is now readable
    Connect,
    /// The wallet disconnected, either on request or on its own
    Disconnect,
    /// The underlying wallet became available
    Ready,
    /// The adapter hit an error outside of a direct call
    Error(WalletError),
}

impl AdapterEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AdapterEvent::Connect => "connect",
            AdapterEvent::Disconnect => "disconnect",
            AdapterEvent::Ready => "ready",
            AdapterEvent::Error(_) => "error",
        }
    }
}

/// Fan-out emitter adapters embed to publish [`AdapterEvent`]s
#[derive(Debug, Clone)]
pub struct AdapterEvents {
    sender: broadcast::Sender<AdapterEvent>,
}

impl AdapterEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Having no listeners is not an error.
    pub fn emit(&self, event: AdapterEvent) {
        log::trace!("adapter event: {}", event.name());
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for AdapterEvents {
    fn default() -> Self {
        Self::new()
    }
}
