use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, Semaphore};

use crate::connection::{Connection, SendTransactionOptions};
use crate::error::WalletError;
use crate::events::{AdapterEvent, AdapterEvents};
use crate::sdk_adapter::{
    keypair_pubkey, keypair_sign_message, AccountMeta, Hash, Instruction, Keypair, Message,
    Pubkey, Signature, Transaction,
};
use crate::traits::{AdapterCapabilities, WalletAdapter};
use crate::transaction_util::TransactionUtil;
use crate::wallet::WalletDescriptor;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);

pub fn create_test_transaction(payer: &Pubkey) -> Transaction {
    let instruction = Instruction::new_with_bytes(
        Pubkey::new_unique(),
        &[1, 0, 0, 0],
        vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(Pubkey::new_unique(), false),
        ],
    );
    let message = Message::new(&[instruction], Some(payer));
    Transaction::new_unsigned(message)
}

/// Await `future`, failing the test if it takes longer than [`TEST_TIMEOUT`]
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(TEST_TIMEOUT, future)
        .await
        .expect("timed out waiting for the session")
}

/// Yield to background tasks until `condition` holds
pub async fn eventually(condition: impl Fn() -> bool) {
    within(async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
}

/// Scriptable adapter that counts calls and emits events on demand
pub struct MockAdapter {
    name: String,
    url: String,
    keypair: Keypair,
    capabilities: AdapterCapabilities,
    auto_approve: bool,
    ready: AtomicBool,
    connected: AtomicBool,
    emit_on_connect: AtomicBool,
    fail_connect: AtomicBool,
    fail_disconnect: AtomicBool,
    connect_gate: Option<Arc<Semaphore>>,
    disconnect_gate: Option<Arc<Semaphore>>,
    pub connect_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
    pub sign_calls: AtomicUsize,
    events: AdapterEvents,
}

impl MockAdapter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("https://{}.example/install", name.to_lowercase()),
            keypair: Keypair::new(),
            capabilities: AdapterCapabilities::all(),
            auto_approve: false,
            ready: AtomicBool::new(true),
            connected: AtomicBool::new(false),
            emit_on_connect: AtomicBool::new(true),
            fail_connect: AtomicBool::new(false),
            fail_disconnect: AtomicBool::new(false),
            connect_gate: None,
            disconnect_gate: None,
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            sign_calls: AtomicUsize::new(0),
            events: AdapterEvents::new(),
        }
    }

    pub fn not_ready(self) -> Self {
        self.ready.store(false, Ordering::SeqCst);
        self
    }

    pub fn with_capabilities(mut self, capabilities: AdapterCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_auto_approve(mut self) -> Self {
        self.auto_approve = true;
        self
    }

    /// `connect` waits for a permit on `gate` before completing
    pub fn with_connect_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.connect_gate = Some(gate);
        self
    }

    /// `disconnect` waits for a permit on `gate` before completing
    pub fn with_disconnect_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.disconnect_gate = Some(gate);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn descriptor(self: &Arc<Self>) -> WalletDescriptor {
        WalletDescriptor::from_adapter(self.clone())
    }

    pub fn pubkey(&self) -> Pubkey {
        keypair_pubkey(&self.keypair)
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_disconnect(&self, fail: bool) {
        self.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    /// Complete `connect` calls without emitting the `connect` event
    pub fn set_silent_connect(&self) {
        self.emit_on_connect.store(false, Ordering::SeqCst);
    }

    pub fn become_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        self.events.emit(AdapterEvent::Ready);
    }

    pub fn emit(&self, event: AdapterEvent) {
        if matches!(event, AdapterEvent::Connect) {
            self.connected.store(true, Ordering::SeqCst);
        }
        if matches!(event, AdapterEvent::Disconnect) {
            self.connected.store(false, Ordering::SeqCst);
        }
        self.events.emit(event);
    }

    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }

    fn count(&self, counter: &AtomicUsize) -> usize {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn pass(gate: &Option<Arc<Semaphore>>) {
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
    }
}

#[async_trait]
impl WalletAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.connected
            .load(Ordering::SeqCst)
            .then(|| keypair_pubkey(&self.keypair))
    }

    fn auto_approve(&self) -> bool {
        self.auto_approve
    }

    fn capabilities(&self) -> AdapterCapabilities {
        self.capabilities
    }

    fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
        self.events.subscribe()
    }

    async fn connect(&self) -> Result<(), WalletError> {
        self.count(&self.connect_calls);
        Self::pass(&self.connect_gate).await;
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(WalletError::UserRejected("connection request denied".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        if self.emit_on_connect.load(Ordering::SeqCst) {
            self.events.emit(AdapterEvent::Connect);
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.count(&self.disconnect_calls);
        Self::pass(&self.disconnect_gate).await;
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(WalletError::DisconnectionFailed("wallet unreachable".to_string()));
        }
        if self.connected.swap(false, Ordering::SeqCst) {
            self.events.emit(AdapterEvent::Disconnect);
        }
        Ok(())
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction, WalletError> {
        self.count(&self.sign_calls);
        let signature = keypair_sign_message(&self.keypair, &transaction.message_data());
        TransactionUtil::add_signature_to_transaction(&mut transaction, &self.pubkey(), signature)?;
        Ok(transaction)
    }

    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletError> {
        let mut signed = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            signed.push(self.sign_transaction(transaction).await?);
        }
        Ok(signed)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        self.count(&self.sign_calls);
        Ok(keypair_sign_message(&self.keypair, message))
    }
}

/// Connection that records broadcasts instead of sending them
pub struct RecordingConnection {
    blockhash: Hash,
    fail: AtomicBool,
    pub sent: Mutex<Vec<(Transaction, SendTransactionOptions)>>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self {
            blockhash: Hash::new_from_array([7u8; 32]),
            fail: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    async fn get_latest_blockhash(&self) -> Result<Hash, WalletError> {
        Ok(self.blockhash)
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: &SendTransactionOptions,
    ) -> Result<Signature, WalletError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(WalletError::RpcError("node is behind".to_string()));
        }
        let signature = transaction.signatures.first().copied().unwrap_or_default();
        self.sent.lock().push((transaction.clone(), options.clone()));
        Ok(signature)
    }
}
