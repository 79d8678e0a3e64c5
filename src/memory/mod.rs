//! Wallet adapter backed by an in-memory keypair

mod keypair_util;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::WalletError;
use crate::events::{AdapterEvent, AdapterEvents};
use crate::sdk_adapter::{keypair_pubkey, keypair_sign_message, Keypair, Pubkey, Signature, Transaction};
use crate::traits::{AdapterCapabilities, WalletAdapter};
use crate::transaction_util::TransactionUtil;

pub const MEMORY_WALLET_NAME: &str = "Memory";
pub const MEMORY_WALLET_URL: &str = "https://docs.solanalabs.com/cli/wallets/file-system";

/// A wallet whose key lives in process memory
///
/// Connects without user interaction and supports every signing
/// capability. Useful for scripts, headless services and tests.
pub struct MemoryWalletAdapter {
    name: String,
    url: String,
    keypair: Keypair,
    auto_approve: bool,
    ready: AtomicBool,
    connected: AtomicBool,
    events: AdapterEvents,
}

impl std::fmt::Debug for MemoryWalletAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryWalletAdapter")
            .field("name", &self.name)
            .field("pubkey", &keypair_pubkey(&self.keypair))
            .field("connected", &self.connected.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl MemoryWalletAdapter {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            name: MEMORY_WALLET_NAME.to_string(),
            url: MEMORY_WALLET_URL.to_string(),
            keypair,
            auto_approve: true,
            ready: AtomicBool::new(true),
            connected: AtomicBool::new(false),
            events: AdapterEvents::new(),
        }
    }

    /// Creates an adapter from a private key string that can be in multiple formats:
    /// - Base58 encoded string
    /// - U8Array format: "[0, 1, 2, ...]"
    /// - File path to a JSON keypair file
    pub fn from_private_key_string(private_key: &str) -> Result<Self, WalletError> {
        Ok(Self::new(keypair_util::parse_keypair(private_key)?))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_auto_approve(mut self, auto_approve: bool) -> Self {
        self.auto_approve = auto_approve;
        self
    }

    /// Start out unavailable until [`MemoryWalletAdapter::set_ready`] is called
    pub fn not_ready(self) -> Self {
        self.ready.store(false, Ordering::Release);
        self
    }

    /// Change availability; becoming ready emits a `ready` event
    pub fn set_ready(&self, ready: bool) {
        let was_ready = self.ready.swap(ready, Ordering::AcqRel);
        if ready && !was_ready {
            self.events.emit(AdapterEvent::Ready);
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        keypair_pubkey(&self.keypair)
    }

    fn ensure_connected(&self) -> Result<(), WalletError> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(WalletError::WalletNotConnected);
        }
        Ok(())
    }

    fn sign(&self, transaction: &mut Transaction) -> Result<(), WalletError> {
        let signature = keypair_sign_message(&self.keypair, &transaction.message_data());
        TransactionUtil::add_signature_to_transaction(transaction, &self.pubkey(), signature)
    }
}

#[async_trait]
impl WalletAdapter for MemoryWalletAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.connected
            .load(Ordering::Acquire)
            .then(|| self.pubkey())
    }

    fn auto_approve(&self) -> bool {
        self.auto_approve
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::all()
    }

    fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
        self.events.subscribe()
    }

    async fn connect(&self) -> Result<(), WalletError> {
        if !self.ready() {
            let err = WalletError::WalletNotReady;
            self.events.emit(AdapterEvent::Error(err.clone()));
            return Err(err);
        }
        // Emit on every success, even when already connected
        self.connected.store(true, Ordering::Release);
        self.events.emit(AdapterEvent::Connect);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        if self.connected.swap(false, Ordering::AcqRel) {
            self.events.emit(AdapterEvent::Disconnect);
        }
        Ok(())
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction, WalletError> {
        self.ensure_connected()?;
        self.sign(&mut transaction)?;
        Ok(transaction)
    }

    async fn sign_all_transactions(
        &self,
        mut transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletError> {
        self.ensure_connected()?;
        for transaction in &mut transactions {
            self.sign(transaction)?;
        }
        Ok(transactions)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        self.ensure_connected()?;
        Ok(keypair_sign_message(&self.keypair, message))
    }
}
