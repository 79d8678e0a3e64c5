//! Wallet session manager
//!
//! [`WalletSessionManager`] owns the wallet roster, the selected adapter and
//! its connection lifecycle. State lives in a single `tokio::sync::watch`
//! channel: every mutation produces a new snapshot, and precondition checks
//! happen inside the same critical section that flips the `connecting` /
//! `disconnecting` guards, so two racing calls can never both pass.
//!
//! Adapter events are bridged per activation. Each selected adapter gets a
//! generation number, and events or completions from an adapter that is no
//! longer active are discarded.

mod state;
mod subscription;


use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use state::{AdapterHandle, SessionState, SessionStatus, StateView};
use subscription::Subscription;

use crate::config::{WalletConfig, WalletOptions};
use crate::connection::{Connection, SendTransactionOptions};
use crate::error::WalletError;
use crate::events::AdapterEvent;
use crate::sdk_adapter::{Pubkey, Signature, Transaction};
use crate::storage::WalletStorage;
use crate::traits::UrlOpener;
use crate::wallet::WalletDescriptor;

/// Outcome of the synchronous guard check that opens connect/disconnect
enum Gate {
    Skip,
    NotSelected,
    NotReady(String),
    Proceed(AdapterHandle),
}

/// Reactive connection manager for a roster of wallet adapters
pub struct WalletSessionManager {
    state: watch::Sender<SessionState>,
    config: WalletConfig,
    storage: Arc<dyn WalletStorage>,
    url_opener: Arc<dyn UrlOpener>,
    generations: AtomicU64,
    selection: tokio::sync::Mutex<()>,
    subscription: Mutex<Option<Subscription>>,
    auto_connect: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl fmt::Debug for WalletSessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("WalletSessionManager")
            .field("selected_wallet", &state.selected_wallet)
            .field("status", &state.status())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WalletSessionManager {
    /// Create a session and restore the persisted wallet choice
    ///
    /// Falls back to `config.default_wallet` when nothing was persisted.
    /// Restoring only selects; it connects only when auto-connect is on.
    /// Must be called from within a tokio runtime.
    pub async fn new(options: WalletOptions) -> Arc<Self> {
        let WalletOptions {
            wallets,
            config,
            storage,
            url_opener,
        } = options;

        let (state, _) = watch::channel(SessionState::new(wallets));
        let manager = Arc::new(Self {
            state,
            config,
            storage,
            url_opener,
            generations: AtomicU64::new(0),
            selection: tokio::sync::Mutex::new(()),
            subscription: Mutex::new(None),
            auto_connect: Mutex::new(None),
            disposed: AtomicBool::new(false),
        });

        if manager.config.auto_connect {
            manager.spawn_auto_connect();
        }

        let initial = match manager.storage.get(&manager.config.storage_key) {
            Ok(Some(name)) => Some(name),
            Ok(None) => manager.config.default_wallet.clone(),
            Err(e) => {
                log::warn!("Failed to read persisted wallet: {e}");
                manager.config.default_wallet.clone()
            }
        };

        if let Some(name) = initial {
            if let Err(e) = manager.select_wallet(Some(&name)).await {
                log::error!("Failed to restore wallet {name}: {e}");
            }
        }

        manager
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Raw receiver over full state snapshots
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn wallets(&self) -> StateView<Vec<WalletDescriptor>> {
        StateView::new(self.subscribe(), |s| s.wallets.clone())
    }

    pub fn selected_wallet(&self) -> StateView<Option<String>> {
        StateView::new(self.subscribe(), |s| s.selected_wallet.clone())
    }

    pub fn wallet(&self) -> StateView<Option<WalletDescriptor>> {
        StateView::new(self.subscribe(), |s| s.wallet.clone())
    }

    pub fn adapter(&self) -> StateView<Option<AdapterHandle>> {
        StateView::new(self.subscribe(), |s| s.adapter.clone())
    }

    pub fn connected(&self) -> StateView<bool> {
        StateView::new(self.subscribe(), |s| s.connected)
    }

    pub fn connecting(&self) -> StateView<bool> {
        StateView::new(self.subscribe(), |s| s.connecting)
    }

    pub fn disconnecting(&self) -> StateView<bool> {
        StateView::new(self.subscribe(), |s| s.disconnecting)
    }

    pub fn ready(&self) -> StateView<bool> {
        StateView::new(self.subscribe(), |s| s.ready)
    }

    pub fn public_key(&self) -> StateView<Option<Pubkey>> {
        StateView::new(self.subscribe(), |s| s.public_key)
    }

    pub fn auto_approve(&self) -> StateView<bool> {
        StateView::new(self.subscribe(), |s| s.auto_approve)
    }

    pub fn status(&self) -> StateView<SessionStatus> {
        StateView::new(self.subscribe(), SessionState::status)
    }

    /// Select a wallet by name, or clear the selection with `None`
    ///
    /// Selecting the current wallet again does nothing. Otherwise the active
    /// adapter (if any) is asked to disconnect, ignoring failures, the choice
    /// is persisted, and a fresh adapter is created from the roster. A name
    /// missing from the roster leaves no adapter active.
    pub async fn select_wallet(self: &Arc<Self>, name: Option<&str>) -> Result<(), WalletError> {
        self.ensure_active()?;
        let _selection = self.selection.lock().await;
        self.ensure_active()?;

        let previous = {
            let state = self.state.borrow();
            if state.selected_wallet.as_deref() == name {
                log::debug!("Wallet {name:?} already selected");
                return Ok(());
            }
            state.adapter.clone()
        };

        if let Some(previous) = previous {
            log::debug!("Disconnecting {} before switching wallets", previous.name());
            if let Err(e) = previous.adapter().disconnect().await {
                log::warn!("Failed to disconnect {}: {e}", previous.name());
            }
        }

        self.persist_selection(name);
        self.activate(name);
        Ok(())
    }

    /// Connect the selected wallet
    ///
    /// A no-op while connected, connecting or disconnecting. When the wallet
    /// is not ready its install URL is opened and `WalletNotReady` returned.
    /// Adapter failures are logged, not returned: the session only becomes
    /// connected once the adapter emits its `connect` event.
    pub async fn connect(&self) -> Result<(), WalletError> {
        self.ensure_active()?;

        let mut gate = Gate::Skip;
        self.state.send_if_modified(|state| {
            if state.connected || state.connecting || state.disconnecting {
                return false;
            }
            let (Some(wallet), Some(handle)) = (&state.wallet, &state.adapter) else {
                gate = Gate::NotSelected;
                return false;
            };
            if !state.ready {
                gate = Gate::NotReady(wallet.url().to_string());
                return false;
            }
            gate = Gate::Proceed(handle.clone());
            state.connecting = true;
            true
        });

        let handle = match gate {
            Gate::Skip => {
                log::debug!("Connect skipped, session is busy or already connected");
                return Ok(());
            }
            Gate::NotSelected => return Err(Self::report(WalletError::WalletNotSelected)),
            Gate::NotReady(url) => {
                self.url_opener.open(&url);
                return Err(Self::report(WalletError::WalletNotReady));
            }
            Gate::Proceed(handle) => handle,
        };

        log::info!("Connecting to {}", handle.name());
        if let Err(e) = handle.adapter().connect().await {
            log::warn!("Failed to connect to {}: {e}", handle.name());
        }

        let generation = handle.generation();
        self.state.send_if_modified(|state| {
            if !state.is_active(generation) || !state.connecting {
                return false;
            }
            state.connecting = false;
            true
        });

        Ok(())
    }

    /// Disconnect the selected wallet
    ///
    /// A no-op while a connect or disconnect is in flight. Adapter failures
    /// are logged; the session becomes disconnected on the adapter's
    /// `disconnect` event.
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        self.ensure_active()?;

        let mut gate = Gate::Skip;
        self.state.send_if_modified(|state| {
            if state.disconnecting || state.connecting {
                return false;
            }
            let Some(handle) = &state.adapter else {
                gate = Gate::NotSelected;
                return false;
            };
            gate = Gate::Proceed(handle.clone());
            state.disconnecting = true;
            true
        });

        let handle = match gate {
            Gate::Proceed(handle) => handle,
            Gate::NotSelected => return Err(Self::report(WalletError::WalletNotSelected)),
            Gate::Skip | Gate::NotReady(_) => {
                log::debug!("Disconnect skipped, session is busy");
                return Ok(());
            }
        };

        log::info!("Disconnecting from {}", handle.name());
        if let Err(e) = handle.adapter().disconnect().await {
            log::warn!("Failed to disconnect from {}: {e}", handle.name());
        }

        let generation = handle.generation();
        self.state.send_if_modified(|state| {
            if !state.is_active(generation) || !state.disconnecting {
                return false;
            }
            state.disconnecting = false;
            true
        });

        Ok(())
    }

    /// Sign and broadcast `transaction` through the connected wallet
    pub async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn Connection,
        options: &SendTransactionOptions,
    ) -> Result<Signature, WalletError> {
        let handle = self.connected_adapter()?;
        handle
            .adapter()
            .send_transaction(transaction, connection, options)
            .await
            .inspect_err(|e| log::error!("{} failed to send transaction: {e}", handle.name()))
    }

    pub async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError> {
        let handle = self.connected_adapter()?;
        if !handle.capabilities().sign_transaction {
            return Err(WalletError::SignTransactionNotSupported);
        }
        handle.adapter().sign_transaction(transaction).await
    }

    pub async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletError> {
        let handle = self.connected_adapter()?;
        if !handle.capabilities().sign_all_transactions {
            return Err(WalletError::SignAllTransactionsNotSupported);
        }
        handle.adapter().sign_all_transactions(transactions).await
    }

    pub async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        let handle = self.connected_adapter()?;
        if !handle.capabilities().sign_message {
            return Err(WalletError::SignMessageNotSupported);
        }
        handle.adapter().sign_message(message).await
    }

    /// Signer bound to the currently connected account, if there is one
    pub fn session_signer(self: &Arc<Self>) -> Option<SessionSigner> {
        let public_key = self.state.borrow().public_key?;
        Some(SessionSigner {
            public_key,
            session: Arc::clone(self),
        })
    }

    /// Tear the session down
    ///
    /// Disconnects a connected adapter (best-effort), stops event bridging
    /// and auto-connect, and clears the selection. Later operations fail
    /// with `SessionDisposed`.
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _selection = self.selection.lock().await;

        if let Some(task) = self.auto_connect.lock().take() {
            task.abort();
        }
        drop(self.subscription.lock().take());

        let connected = {
            let state = self.state.borrow();
            state.adapter.clone().filter(|_| state.connected)
        };
        if let Some(handle) = connected {
            if let Err(e) = handle.adapter().disconnect().await {
                log::warn!("Failed to disconnect {} on dispose: {e}", handle.name());
            }
        }

        self.state.send_modify(|state| {
            state.selected_wallet = None;
            state.wallet = None;
            state.adapter = None;
            state.ready = false;
            state.clear_connection();
        });
        log::debug!("Wallet session disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn ensure_active(&self) -> Result<(), WalletError> {
        if self.is_disposed() {
            return Err(WalletError::SessionDisposed);
        }
        Ok(())
    }

    fn report(error: WalletError) -> WalletError {
        log::error!("{error}");
        error
    }

    fn connected_adapter(&self) -> Result<AdapterHandle, WalletError> {
        self.ensure_active()?;
        let state = self.state.borrow();
        let handle = state.adapter.clone().ok_or(WalletError::WalletNotSelected)?;
        if !state.connected {
            return Err(WalletError::WalletNotConnected);
        }
        Ok(handle)
    }

    fn persist_selection(&self, name: Option<&str>) {
        let key = &self.config.storage_key;
        let result = match name {
            Some(name) => self.storage.set(key, name),
            None => self.storage.remove(key),
        };
        if let Err(e) = result {
            log::warn!("Failed to persist wallet selection under {key}: {e}");
        }
    }

    /// Swap in the adapter for `name`, tearing down the old event listener first
    fn activate(self: &Arc<Self>, name: Option<&str>) {
        drop(self.subscription.lock().take());

        let descriptor = name.and_then(|name| {
            self.state
                .borrow()
                .wallets
                .iter()
                .find(|wallet| wallet.name() == name)
                .cloned()
        });

        let activation = descriptor.as_ref().map(|descriptor| {
            let adapter = descriptor.create_adapter();
            // Subscribe before reading readiness so a `ready` emitted in between is queued
            let events = adapter.subscribe();
            let ready = adapter.ready();
            let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
            (AdapterHandle::new(adapter, generation), events, ready)
        });

        if name.is_some() && descriptor.is_none() {
            log::warn!("Wallet {name:?} is not in the roster");
        }

        self.state.send_modify(|state| {
            state.selected_wallet = name.map(str::to_string);
            state.wallet = descriptor.clone();
            state.clear_connection();
            match &activation {
                Some((handle, _, ready)) => {
                    state.adapter = Some(handle.clone());
                    state.ready = *ready;
                }
                None => {
                    state.adapter = None;
                    state.ready = false;
                }
            }
        });

        if let Some((handle, events, ready)) = activation {
            log::info!("Selected wallet {} (ready: {ready})", handle.name());
            let subscription = Subscription::spawn(self, handle.generation(), events);
            *self.subscription.lock() = Some(subscription);
        }
    }

    /// Apply an adapter event, unless it comes from an adapter that is no longer active
    fn apply_adapter_event(&self, generation: u64, event: AdapterEvent) {
        self.state.send_if_modified(|state| {
            let adapter = match &state.adapter {
                Some(handle) if handle.generation() == generation => handle.adapter().clone(),
                _ => {
                    log::debug!(
                        "Ignoring {} event from inactive adapter generation {generation}",
                        event.name()
                    );
                    return false;
                }
            };

            match event {
                AdapterEvent::Connect => {
                    let Some(public_key) = adapter.public_key() else {
                        log::warn!("{} emitted connect without a public key", adapter.name());
                        return false;
                    };
                    if state.connected && state.public_key == Some(public_key) {
                        return false;
                    }
                    log::info!("Connected to {} as {public_key}", adapter.name());
                    state.connected = true;
                    state.public_key = Some(public_key);
                    state.auto_approve = adapter.auto_approve();
                    true
                }
                AdapterEvent::Disconnect => {
                    log::info!("Disconnected from {}", adapter.name());
                    state.clear_connection();
                    true
                }
                AdapterEvent::Ready => {
                    if state.ready {
                        return false;
                    }
                    state.ready = true;
                    true
                }
                AdapterEvent::Error(e) => {
                    log::error!("{} reported an error: {e}", adapter.name());
                    false
                }
            }
        });
    }

    /// Connect once per adapter activation as soon as it is selected and ready
    fn spawn_auto_connect(self: &Arc<Self>) {
        let session = Arc::downgrade(self);
        let mut rx = self.state.subscribe();

        let task = tokio::spawn(async move {
            let mut attempted = None;
            loop {
                let trigger = {
                    let state = rx.borrow_and_update();
                    match &state.adapter {
                        Some(handle) if state.ready && attempted != Some(handle.generation()) => {
                            Some(handle.generation())
                        }
                        _ => None,
                    }
                };

                if let Some(generation) = trigger {
                    attempted = Some(generation);
                    let Some(session) = session.upgrade() else {
                        break;
                    };
                    log::debug!("Auto-connecting adapter generation {generation}");
                    if let Err(e) = session.connect().await {
                        log::warn!("Auto-connect failed: {e}");
                    }
                }

                if rx.changed().await.is_err() {
                    break;
                }
            }
        });

        *self.auto_connect.lock() = Some(task);
    }
}

impl Drop for WalletSessionManager {
    fn drop(&mut self) {
        if let Some(task) = self.auto_connect.get_mut().take() {
            task.abort();
        }
    }
}

/// Public key of the connected account paired with signing routed through the session
#[derive(Clone)]
pub struct SessionSigner {
    public_key: Pubkey,
    session: Arc<WalletSessionManager>,
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn public_key(&self) -> Pubkey {
        self.public_key
    }

    pub async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError> {
        self.session.sign_transaction(transaction).await
    }

    pub async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletError> {
        self.session.sign_all_transactions(transactions).await
    }
}
