//! Core trait definitions for wallet adapters

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::connection::{Connection, SendTransactionOptions};
use crate::error::WalletError;
use crate::events::AdapterEvent;
use crate::sdk_adapter::{Hash, Pubkey, Signature, Transaction};

/// Optional operations an adapter supports beyond connect/disconnect/send
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterCapabilities {
    pub sign_transaction: bool,
    pub sign_all_transactions: bool,
    pub sign_message: bool,
}

impl AdapterCapabilities {
    /// Every optional operation is available
    pub fn all() -> Self {
        Self {
            sign_transaction: true,
            sign_all_transactions: true,
            sign_message: true,
        }
    }
}

/// Capability object for a single wallet
///
/// Implementations report connection changes through the event stream
/// returned by [`WalletAdapter::subscribe`] rather than through the return
/// value of [`WalletAdapter::connect`], so wallets that finish connecting
/// through an external approval flow still update the session.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Wallet name, unique within a roster
    fn name(&self) -> &str;

    /// Where the user can install this wallet
    fn url(&self) -> &str;

    /// Whether the underlying wallet is installed and usable
    fn ready(&self) -> bool;

    /// The connected account, if any
    fn public_key(&self) -> Option<Pubkey>;

    fn auto_approve(&self) -> bool {
        false
    }

    /// Optional operations this adapter implements
    ///
    /// Read once when the adapter is activated and cached on its
    /// [`AdapterHandle`](crate::AdapterHandle), so the value must not change
    /// over the adapter's lifetime. Operations not advertised here are never
    /// dispatched to the adapter.
    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::default()
    }

    /// Listen for `connect`, `disconnect`, `ready` and `error` events
    fn subscribe(&self) -> broadcast::Receiver<AdapterEvent>;

    async fn connect(&self) -> Result<(), WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    /// Sign a transaction, returning it with this wallet's signature attached
    async fn sign_transaction(&self, _transaction: Transaction) -> Result<Transaction, WalletError> {
        Err(WalletError::SignTransactionNotSupported)
    }

    async fn sign_all_transactions(
        &self,
        _transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletError> {
        Err(WalletError::SignAllTransactionsNotSupported)
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<Signature, WalletError> {
        Err(WalletError::SignMessageNotSupported)
    }

    /// Sign and broadcast a transaction through `connection`
    ///
    /// The default fills in a missing recent blockhash, signs with
    /// [`WalletAdapter::sign_transaction`] and broadcasts the result. It fails
    /// with `SendTransactionFailed` for adapters whose capabilities exclude
    /// transaction signing, matching what the session cached at activation.
    /// Wallets that submit transactions themselves override this.
    async fn send_transaction(
        &self,
        mut transaction: Transaction,
        connection: &dyn Connection,
        options: &SendTransactionOptions,
    ) -> Result<Signature, WalletError> {
        if !self.capabilities().sign_transaction {
            return Err(WalletError::SendTransactionFailed(format!(
                "{} cannot sign transactions",
                self.name()
            )));
        }

        if transaction.message.recent_blockhash == Hash::default() {
            transaction.message.recent_blockhash = connection.get_latest_blockhash().await?;
        }

        let signed = self.sign_transaction(transaction).await?;
        connection.send_transaction(&signed, options).await
    }
}

/// Opens a wallet's install page when connecting to a wallet that is not ready
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str);
}

/// [`UrlOpener`] for headless environments: records the URL in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogUrlOpener;

impl UrlOpener for LogUrlOpener {
    fn open(&self, url: &str) {
        log::info!("Wallet is not installed, visit {url} to install it");
    }
}
