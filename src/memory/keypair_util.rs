//! Keypair loading for the memory wallet

use std::fs;
use std::path::Path;

use crate::error::WalletError;
use crate::sdk_adapter::{keypair_from_bytes, Keypair};

const SECRET_KEY_LENGTH: usize = 64;

/// Load a keypair from a JSON keypair file path, a `[u8, ...]` array or a base58 string
pub(crate) fn parse_keypair(source: &str) -> Result<Keypair, WalletError> {
    let source = source.trim();

    if Path::new(source).is_file() {
        let content = fs::read_to_string(source)?;
        return keypair_from_json_array(&content);
    }

    if source.starts_with('[') {
        return keypair_from_json_array(source);
    }

    let bytes = bs58::decode(source)
        .into_vec()
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid base58 string: {e}")))?;
    keypair_from_secret(&bytes)
}

fn keypair_from_json_array(json: &str) -> Result<Keypair, WalletError> {
    let bytes: Vec<u8> = serde_json::from_str(json).map_err(|e| {
        WalletError::InvalidPrivateKey(format!("Expected a JSON array of {SECRET_KEY_LENGTH} bytes: {e}"))
    })?;
    keypair_from_secret(&bytes)
}

fn keypair_from_secret(bytes: &[u8]) -> Result<Keypair, WalletError> {
    if bytes.len() != SECRET_KEY_LENGTH {
        return Err(WalletError::InvalidPrivateKey(format!(
            "Private key must be exactly {SECRET_KEY_LENGTH} bytes, got {}",
            bytes.len()
        )));
    }
    keypair_from_bytes(bytes)
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid private key bytes: {e}")))
}
