use crate::error::WalletError;
use crate::sdk_adapter::{Pubkey, Signature, Transaction};

pub struct TransactionUtil;

impl TransactionUtil {
    /// Index of `pubkey` among the transaction's required signers
    pub fn signer_position(transaction: &Transaction, pubkey: &Pubkey) -> Result<usize, WalletError> {
        let num_required_signatures = transaction.message.header.num_required_signatures as usize;

        let signers = transaction
            .message
            .account_keys
            .get(..num_required_signatures)
            .ok_or_else(|| {
                WalletError::SigningFailed("Invalid account index: not enough account keys".to_string())
            })?;

        signers.iter().position(|key| key == pubkey).ok_or_else(|| {
            WalletError::SigningFailed(format!("Pubkey {pubkey} is not a signer of this transaction"))
        })
    }

    /// Place `signature` in the slot belonging to `pubkey`, leaving other signers' slots alone
    pub fn add_signature_to_transaction(
        transaction: &mut Transaction,
        pubkey: &Pubkey,
        signature: Signature,
    ) -> Result<(), WalletError> {
        let position = Self::signer_position(transaction, pubkey)?;

        let num_required_signatures = transaction.message.header.num_required_signatures as usize;
        if transaction.signatures.len() < num_required_signatures {
            transaction
                .signatures
                .resize(num_required_signatures, Signature::default());
        }

        transaction.signatures[position] = signature;

        Ok(())
    }
}
