//! Error types for wallet session operations

use std::fmt;
use thiserror::Error;

/// Errors that can occur while managing a wallet session
#[derive(Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// An operation needing an active adapter ran with no wallet selected
    #[error("Wallet not selected")]
    WalletNotSelected,

    /// An operation needing a live connection ran while disconnected
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// The selected wallet is not installed or otherwise unavailable
    #[error("Wallet not ready")]
    WalletNotReady,

    #[error("Wallet does not support signing transactions")]
    SignTransactionNotSupported,

    #[error("Wallet does not support signing multiple transactions")]
    SignAllTransactionsNotSupported,

    #[error("Wallet does not support signing messages")]
    SignMessageNotSupported,

    /// The session manager has been disposed
    #[error("Wallet session disposed")]
    SessionDisposed,

    /// Adapter failed to connect
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Adapter failed to disconnect
    #[error("Disconnection failed: {0}")]
    DisconnectionFailed(String),

    /// Signing operation failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Broadcasting a transaction failed
    #[error("Send transaction failed: {0}")]
    SendTransactionFailed(String),

    /// The wallet owner rejected the request
    #[error("User rejected the request: {0}")]
    UserRejected(String),

    /// RPC connection error
    #[error("RPC error: {0}")]
    RpcError(String),

    /// Invalid private key format
    #[error("Invalid private key format: {0}")]
    InvalidPrivateKey(String),

    /// Persistence backend error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(String),

    /// Catch-all for adapter implementations whose failures fit no other variant
    #[error("{0}")]
    Other(String),
}

impl WalletError {
    /// Whether this error is a session precondition violation rather than
    /// a failure reported by the adapter or its collaborators.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            WalletError::WalletNotSelected
                | WalletError::WalletNotConnected
                | WalletError::WalletNotReady
                | WalletError::SignTransactionNotSupported
                | WalletError::SignAllTransactionsNotSupported
                | WalletError::SignMessageNotSupported
                | WalletError::SessionDisposed
        )
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        WalletError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::SerializationError(err.to_string())
    }
}

// Adapter messages can carry key material or remote responses, keep them out of Debug output
impl fmt::Debug for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, redacted) = match self {
            WalletError::WalletNotSelected => ("WalletNotSelected", false),
            WalletError::WalletNotConnected => ("WalletNotConnected", false),
            WalletError::WalletNotReady => ("WalletNotReady", false),
            WalletError::SignTransactionNotSupported => ("SignTransactionNotSupported", false),
            WalletError::SignAllTransactionsNotSupported => {
                ("SignAllTransactionsNotSupported", false)
            }
            WalletError::SignMessageNotSupported => ("SignMessageNotSupported", false),
            WalletError::SessionDisposed => ("SessionDisposed", false),
            WalletError::ConnectionFailed(_) => ("ConnectionFailed", true),
            WalletError::DisconnectionFailed(_) => ("DisconnectionFailed", true),
            WalletError::SigningFailed(_) => ("SigningFailed", true),
            WalletError::SendTransactionFailed(_) => ("SendTransactionFailed", true),
            WalletError::UserRejected(_) => ("UserRejected", true),
            WalletError::RpcError(_) => ("RpcError", true),
            WalletError::InvalidPrivateKey(_) => ("InvalidPrivateKey", true),
            WalletError::StorageError(_) => ("StorageError", true),
            WalletError::SerializationError(_) => ("SerializationError", true),
            WalletError::ConfigError(_) => ("ConfigError", true),
            WalletError::IoError(_) => ("IoError", true),
            WalletError::Other(_) => ("Other", true),
        };
        if redacted {
            write!(f, "WalletError::{name}([REDACTED])")
        } else {
            write!(f, "WalletError::{name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_messages() {
        let err = WalletError::InvalidPrivateKey("5Kd3...secret".to_string());
        assert_eq!(
            format!("{err:?}"),
            "WalletError::InvalidPrivateKey([REDACTED])"
        );
        assert!(err.to_string().contains("secret"));

        let err = WalletError::Other("extension crashed: token abc".to_string());
        assert_eq!(format!("{err:?}"), "WalletError::Other([REDACTED])");
        assert_eq!(err.to_string(), "extension crashed: token abc");
    }

    #[test]
    fn test_precondition_taxonomy() {
        assert!(WalletError::WalletNotSelected.is_precondition());
        assert!(WalletError::SignMessageNotSupported.is_precondition());
        assert!(!WalletError::ConnectionFailed("popup closed".into()).is_precondition());
        assert_eq!(
            format!("{:?}", WalletError::WalletNotReady),
            "WalletError::WalletNotReady"
        );
    }
}
