//! Reactive Solana wallet session management
//!
//! This crate mediates between an application and a roster of pluggable
//! wallet adapters. A [`WalletSessionManager`] selects the active adapter,
//! drives its connect/disconnect lifecycle, persists the chosen wallet,
//! bridges adapter events into an observable state snapshot, and dispatches
//! signing and sending requests once the wallet is connected.
//!
//! # Features
//!
//! ## Wallet Adapters
//! - `memory` (default): Keypair-backed adapter for headless use
//!
//! ## Connection
//! - `rpc`: [`Connection`] implementation over the Solana RPC client
//!
//! ## SDK Version Selection
//! - `sdk-v2` (default): Use Solana SDK v2.3.x
//! - `sdk-v3`: Use Solana SDK v3.x
//!
//! **Note**: Only one SDK version can be enabled at a time.

pub mod config;
pub mod connection;
pub mod error;
pub mod events;
mod sdk_adapter;
pub mod session;
pub mod storage;
#[cfg(test)]
pub mod test_util;
pub mod traits;
pub mod transaction_util;
pub mod wallet;

#[cfg(feature = "memory")]
pub mod memory;

// Re-export core types
pub use config::{WalletConfig, WalletOptions};
pub use connection::{Commitment, Connection, ConnectionConfig, SendTransactionOptions};
pub use error::WalletError;
pub use events::{AdapterEvent, AdapterEvents};
pub use session::{
    AdapterHandle, SessionSigner, SessionState, SessionStatus, StateView, WalletSessionManager,
};
pub use storage::{FileStorage, MemoryStorage, WalletStorage};
pub use traits::{AdapterCapabilities, LogUrlOpener, UrlOpener, WalletAdapter};
pub use wallet::WalletDescriptor;

pub use sdk_adapter::{Hash, Keypair, Pubkey, Signature, Transaction};

#[cfg(feature = "rpc")]
pub use connection::RpcConnection;

#[cfg(feature = "memory")]
pub use memory::MemoryWalletAdapter;
