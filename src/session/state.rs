//! Session state record and its observable views

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::WalletError;
use crate::sdk_adapter::Pubkey;
use crate::traits::{AdapterCapabilities, WalletAdapter};
use crate::wallet::WalletDescriptor;

/// The active adapter together with what was learned about it at activation
///
/// Each activation gets a fresh generation number. Two handles compare equal
/// only when they come from the same activation, even if they wrap the same
/// adapter object.
#[derive(Clone)]
pub struct AdapterHandle {
    adapter: Arc<dyn WalletAdapter>,
    capabilities: AdapterCapabilities,
    generation: u64,
}

impl AdapterHandle {
    pub(crate) fn new(adapter: Arc<dyn WalletAdapter>, generation: u64) -> Self {
        let capabilities = adapter.capabilities();
        Self {
            adapter,
            capabilities,
            generation,
        }
    }

    pub fn adapter(&self) -> &Arc<dyn WalletAdapter> {
        &self.adapter
    }

    pub fn capabilities(&self) -> AdapterCapabilities {
        self.capabilities
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn name(&self) -> &str {
        self.adapter.name()
    }
}

impl PartialEq for AdapterHandle {
    fn eq(&self, other: &Self) -> bool {
        self.generation == other.generation
    }
}

impl fmt::Debug for AdapterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterHandle")
            .field("name", &self.adapter.name())
            .field("capabilities", &self.capabilities)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Snapshot of a wallet session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Roster in display order
    pub wallets: Vec<WalletDescriptor>,
    pub selected_wallet: Option<String>,
    /// Roster entry matching `selected_wallet`
    pub wallet: Option<WalletDescriptor>,
    pub adapter: Option<AdapterHandle>,
    pub connecting: bool,
    pub disconnecting: bool,
    pub connected: bool,
    pub ready: bool,
    pub public_key: Option<Pubkey>,
    pub auto_approve: bool,
}

impl SessionState {
    pub(crate) fn new(wallets: Vec<WalletDescriptor>) -> Self {
        Self {
            wallets,
            selected_wallet: None,
            wallet: None,
            adapter: None,
            connecting: false,
            disconnecting: false,
            connected: false,
            ready: false,
            public_key: None,
            auto_approve: false,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.adapter.is_none() {
            SessionStatus::Unselected
        } else if self.disconnecting {
            SessionStatus::Disconnecting
        } else if self.connected {
            SessionStatus::Connected
        } else if self.connecting {
            SessionStatus::Connecting
        } else if self.ready {
            SessionStatus::Ready
        } else {
            SessionStatus::NotReady
        }
    }

    pub(crate) fn is_active(&self, generation: u64) -> bool {
        self.adapter
            .as_ref()
            .is_some_and(|handle| handle.generation() == generation)
    }

    pub(crate) fn clear_connection(&mut self) {
        self.connected = false;
        self.connecting = false;
        self.disconnecting = false;
        self.public_key = None;
        self.auto_approve = false;
    }
}

/// Coarse lifecycle position derived from the flag set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unselected,
    NotReady,
    Ready,
    Connecting,
    Connected,
    Disconnecting,
}

/// Push-based view of one value derived from the session state
///
/// Every view owns its own receiver, so subscribers never affect each other.
pub struct StateView<T> {
    rx: watch::Receiver<SessionState>,
    select: fn(&SessionState) -> T,
    last: T,
}

impl<T: Clone + PartialEq> StateView<T> {
    pub(crate) fn new(mut rx: watch::Receiver<SessionState>, select: fn(&SessionState) -> T) -> Self {
        let last = select(&rx.borrow_and_update());
        Self { rx, select, last }
    }

    /// Current value
    pub fn get(&self) -> T {
        (self.select)(&self.rx.borrow())
    }

    /// Wait until the value differs from the last one this view returned
    ///
    /// Fails with [`WalletError::SessionDisposed`] once the manager is gone.
    pub async fn changed(&mut self) -> Result<T, WalletError> {
        loop {
            self.rx
                .changed()
                .await
                .map_err(|_| WalletError::SessionDisposed)?;
            let next = (self.select)(&self.rx.borrow_and_update());
            if next != self.last {
                self.last = next.clone();
                return Ok(next);
            }
        }
    }

    /// Wait until the value satisfies `predicate`, returning immediately if it already does
    pub async fn wait_for(&mut self, predicate: impl Fn(&T) -> bool) -> Result<T, WalletError> {
        let current = (self.select)(&self.rx.borrow_and_update());
        if predicate(&current) {
            self.last = current.clone();
            return Ok(current);
        }
        loop {
            let next = self.changed().await?;
            if predicate(&next) {
                return Ok(next);
            }
        }
    }
}

impl<T: fmt::Debug + Clone + PartialEq> fmt::Debug for StateView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateView")
            .field("value", &self.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::MockAdapter;

    #[tokio::test]
    async fn test_view_skips_unrelated_updates() {
        let (tx, rx) = watch::channel(SessionState::new(Vec::new()));
        let mut connected = StateView::new(rx, |s| s.connected);

        tx.send_modify(|s| s.ready = true);
        tx.send_modify(|s| s.connected = true);

        assert!(connected.changed().await.unwrap());
        assert!(connected.get());
    }

    #[tokio::test]
    async fn test_view_reports_disposal() {
        let (tx, rx) = watch::channel(SessionState::new(Vec::new()));
        let mut ready = StateView::new(rx, |s| s.ready);
        drop(tx);

        assert_eq!(ready.changed().await, Err(WalletError::SessionDisposed));
    }

    #[test]
    fn test_status_precedence() {
        let mut state = SessionState::new(Vec::new());
        assert_eq!(state.status(), SessionStatus::Unselected);
        assert!(!state.is_active(1));

        // Flags alone mean nothing without an adapter
        state.connected = true;
        assert_eq!(state.status(), SessionStatus::Unselected);
        state.connected = false;

        state.adapter = Some(AdapterHandle::new(MockAdapter::new("Phantom").into_arc(), 1));
        assert!(state.is_active(1));
        assert!(!state.is_active(2));
        assert_eq!(state.status(), SessionStatus::NotReady);

        state.ready = true;
        assert_eq!(state.status(), SessionStatus::Ready);

        state.connecting = true;
        assert_eq!(state.status(), SessionStatus::Connecting);

        state.connected = true;
        assert_eq!(state.status(), SessionStatus::Connected);

        state.disconnecting = true;
        assert_eq!(state.status(), SessionStatus::Disconnecting);

        state.public_key = Some(Pubkey::new_unique());
        state.auto_approve = true;
        state.clear_connection();
        assert_eq!(state.public_key, None);
        assert!(!state.auto_approve);
        assert_eq!(state.status(), SessionStatus::Ready);
    }
}
