//! Network connection collaborator
//!
//! The session manager never talks to the cluster itself. It hands a
//! [`Connection`] through to the active adapter, which uses it to fetch a
//! recent blockhash and broadcast signed transactions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::sdk_adapter::{Hash, Signature, Transaction};

/// Cluster commitment level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

/// Options forwarded untouched to the connection when broadcasting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendTransactionOptions {
    pub skip_preflight: bool,
    pub preflight_commitment: Option<Commitment>,
    pub max_retries: Option<usize>,
}

/// Endpoint settings for an RPC-backed connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub endpoint: String,
    #[serde(default)]
    pub commitment: Commitment,
}

impl ConnectionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            commitment: Commitment::default(),
        }
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }
}

/// Anything able to fetch a recent blockhash and broadcast a signed transaction
#[async_trait]
pub trait Connection: Send + Sync {
    async fn get_latest_blockhash(&self) -> Result<Hash, WalletError>;

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: &SendTransactionOptions,
    ) -> Result<Signature, WalletError>;
}

#[cfg(feature = "rpc")]
pub use rpc::RpcConnection;

#[cfg(feature = "rpc")]
mod rpc {
    use super::*;
    use crate::sdk_adapter::{CommitmentConfig, CommitmentLevel, RpcClient, RpcSendTransactionConfig};

    impl From<Commitment> for CommitmentLevel {
        fn from(commitment: Commitment) -> Self {
            match commitment {
                Commitment::Processed => CommitmentLevel::Processed,
                Commitment::Confirmed => CommitmentLevel::Confirmed,
                Commitment::Finalized => CommitmentLevel::Finalized,
            }
        }
    }

    /// [`Connection`] backed by the nonblocking Solana RPC client
    pub struct RpcConnection {
        client: RpcClient,
    }

    impl std::fmt::Debug for RpcConnection {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RpcConnection")
                .field("endpoint", &self.client.url())
                .finish_non_exhaustive()
        }
    }

    impl RpcConnection {
        pub fn new(config: &ConnectionConfig) -> Self {
            let commitment = CommitmentConfig {
                commitment: config.commitment.into(),
            };
            Self {
                client: RpcClient::new_with_commitment(config.endpoint.clone(), commitment),
            }
        }
    }

    #[async_trait]
    impl Connection for RpcConnection {
        async fn get_latest_blockhash(&self) -> Result<Hash, WalletError> {
            self.client
                .get_latest_blockhash()
                .await
                .map_err(|e| WalletError::RpcError(format!("Failed to fetch blockhash: {e}")))
        }

        async fn send_transaction(
            &self,
            transaction: &Transaction,
            options: &SendTransactionOptions,
        ) -> Result<Signature, WalletError> {
            let config = RpcSendTransactionConfig {
                skip_preflight: options.skip_preflight,
                preflight_commitment: options.preflight_commitment.map(Into::into),
                max_retries: options.max_retries,
                ..RpcSendTransactionConfig::default()
            };

            self.client
                .send_transaction_with_config(transaction, config)
                .await
                .map_err(|e| {
                    log::error!("RPC send_transaction error: {e}");
                    WalletError::RpcError(format!("Failed to send transaction: {e}"))
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_defaults_to_confirmed() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"endpoint":"http://api.devnet.solana.com"}"#).unwrap();
        assert_eq!(config.commitment, Commitment::Confirmed);
        assert_eq!(
            ConnectionConfig::new("http://localhost:8899")
                .with_commitment(Commitment::Finalized)
                .commitment,
            Commitment::Finalized
        );
    }

    #[test]
    fn test_send_options_from_camel_case() {
        let options: SendTransactionOptions =
            serde_json::from_str(r#"{"skipPreflight":true,"preflightCommitment":"processed"}"#)
                .unwrap();
        assert!(options.skip_preflight);
        assert_eq!(options.preflight_commitment, Some(Commitment::Processed));
        assert_eq!(options.max_retries, None);
    }
}
