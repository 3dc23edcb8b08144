//! Wire encoding for transactions handed across the API boundary.

use serde::{Deserialize, Serialize};
use solana_sdk::transaction::Transaction;
use thiserror::Error;

use super::LedgerError;
use crate::utils::{base64_decode, base64_encode};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionEncodingError {
    #[error("Failed to serialize transaction: {0}")]
    Serialize(String),

    #[error("Failed to decode transaction: {0}")]
    Decode(String),

    #[error("Failed to deserialize transaction: {0}")]
    Deserialize(String),
}

impl From<TransactionEncodingError> for LedgerError {
    fn from(err: TransactionEncodingError) -> Self {
        LedgerError::InputRejected(err.to_string())
    }
}

/// Base64 of the bincode wire form of a (possibly partially signed)
/// transaction. Unsigned slots are carried as all-zero signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSerializedTransaction(String);

impl EncodedSerializedTransaction {
    pub fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<&Transaction> for EncodedSerializedTransaction {
    type Error = TransactionEncodingError;

    fn try_from(transaction: &Transaction) -> Result<Self, Self::Error> {
        let serialized = bincode::serialize(transaction)
            .map_err(|e| TransactionEncodingError::Serialize(e.to_string()))?;
        Ok(Self(base64_encode(&serialized)))
    }
}

impl TryFrom<EncodedSerializedTransaction> for Transaction {
    type Error = TransactionEncodingError;

    fn try_from(encoded: EncodedSerializedTransaction) -> Result<Self, Self::Error> {
        let bytes = base64_decode(encoded.0.trim())
            .map_err(|e| TransactionEncodingError::Decode(e.to_string()))?;
        bincode::deserialize(&bytes)
            .map_err(|e| TransactionEncodingError::Deserialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        message::Message,
        signature::{Keypair, Signature, Signer},
    };
    use solana_system_interface::instruction as system_instruction;

    fn transfer_transaction(payer: &Keypair, co_signer: &Keypair) -> Transaction {
        let recipient = solana_sdk::pubkey::Pubkey::new_unique();
        let instructions = vec![
            system_instruction::transfer(&payer.pubkey(), &recipient, 1_000),
            system_instruction::transfer(&co_signer.pubkey(), &recipient, 1_000),
        ];
        let message =
            Message::new_with_blockhash(&instructions, Some(&payer.pubkey()), &Hash::new_unique());
        Transaction::new_unsigned(message)
    }

    #[test]
    fn test_round_trip_preserves_partial_signatures() {
        let payer = Keypair::new();
        let co_signer = Keypair::new();
        let mut tx = transfer_transaction(&payer, &co_signer);
        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[&co_signer], blockhash).unwrap();

        let encoded = EncodedSerializedTransaction::try_from(&tx).unwrap();
        let decoded = Transaction::try_from(encoded).unwrap();

        assert_eq!(decoded.message, tx.message);
        assert_eq!(decoded.signatures.len(), 2);
        assert_eq!(decoded.signatures[0], Signature::default());
        assert_eq!(decoded.signatures[1], tx.signatures[1]);
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let err = Transaction::try_from(EncodedSerializedTransaction::new("%%%".to_string()))
            .unwrap_err();
        assert!(matches!(err, TransactionEncodingError::Decode(_)));
    }

    #[test]
    fn test_non_transaction_bytes_rejected() {
        let encoded = EncodedSerializedTransaction::new(base64_encode(&[1u8, 2, 3]));
        let err = Transaction::try_from(encoded).unwrap_err();
        assert!(matches!(err, TransactionEncodingError::Deserialize(_)));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let encoded = EncodedSerializedTransaction::new("AQID".to_string());
        assert_eq!(serde_json::to_string(&encoded).unwrap(), "\"AQID\"");
    }
}
