//! Adapter for Solana SDK v2.x

#[cfg(feature = "rpc")]
pub use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig};
#[cfg(feature = "rpc")]
pub use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
pub use solana_sdk::hash::Hash;
#[allow(unused_imports)]
pub use solana_sdk::instruction::{AccountMeta, Instruction};
#[allow(unused_imports)]
pub use solana_sdk::message::Message;
pub use solana_sdk::pubkey::Pubkey;
pub use solana_sdk::signature::{Keypair, Signature};
pub use solana_sdk::signer::Signer;
pub use solana_sdk::transaction::Transaction;

/// Parse a keypair from its 64 secret bytes
pub fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair, String> {
    #[allow(deprecated)]
    Keypair::from_bytes(bytes).map_err(|e| e.to_string())
}

pub fn keypair_pubkey(keypair: &Keypair) -> Pubkey {
    keypair.pubkey()
}

pub fn keypair_sign_message(keypair: &Keypair, message: &[u8]) -> Signature {
    keypair.sign_message(message)
}
