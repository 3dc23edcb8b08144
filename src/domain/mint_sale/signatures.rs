//! Signature bookkeeping for partially signed transactions.

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};

use super::MintSaleError;

/// Required signers whose signature slot is still empty.
pub fn missing_signers(transaction: &Transaction) -> Vec<Pubkey> {
    let required = usize::from(transaction.message.header.num_required_signatures);
    transaction
        .message
        .account_keys
        .iter()
        .take(required)
        .enumerate()
        .filter(|(index, _)| {
            transaction
                .signatures
                .get(*index)
                .map_or(true, |signature| *signature == Signature::default())
        })
        .map(|(_, key)| *key)
        .collect()
}

/// Adds `signer`'s signature without touching the message or the
/// signatures already collected.
pub fn add_signature(
    mut transaction: Transaction,
    signer: &Keypair,
) -> Result<Transaction, MintSaleError> {
    let blockhash = transaction.message.recent_blockhash;
    transaction
        .try_partial_sign(&[signer], blockhash)
        .map_err(|e| MintSaleError::Signing(e.to_string()))?;
    Ok(transaction)
}

/// Completes a mint-and-sell transaction with the buyer's signature.
///
/// Buyers normally sign in their own wallet; this exists for tooling and
/// tests that hold the buyer key locally.
pub fn complete_buyer_signature(
    transaction: Transaction,
    buyer: &Keypair,
) -> Result<Transaction, MintSaleError> {
    add_signature(transaction, buyer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{hash::Hash, message::Message, signature::Signer};
    use solana_system_interface::instruction as system_instruction;

    fn two_signer_transaction(payer: &Keypair, other: &Keypair) -> Transaction {
        let instructions = vec![
            system_instruction::transfer(&payer.pubkey(), &other.pubkey(), 1),
            system_instruction::transfer(&other.pubkey(), &payer.pubkey(), 1),
        ];
        Transaction::new_unsigned(Message::new_with_blockhash(
            &instructions,
            Some(&payer.pubkey()),
            &Hash::new_unique(),
        ))
    }

    #[test]
    fn test_missing_signers_shrinks_as_signatures_arrive() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let tx = two_signer_transaction(&payer, &other);
        assert_eq!(missing_signers(&tx), vec![payer.pubkey(), other.pubkey()]);

        let tx = add_signature(tx, &other).unwrap();
        assert_eq!(missing_signers(&tx), vec![payer.pubkey()]);

        let tx = complete_buyer_signature(tx, &payer).unwrap();
        assert!(missing_signers(&tx).is_empty());
        assert!(tx.verify().is_ok());
    }

    #[test]
    fn test_adding_signature_keeps_existing_ones() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let tx = add_signature(two_signer_transaction(&payer, &other), &other).unwrap();
        let other_signature = tx.signatures[1];
        let message = tx.message.clone();

        let tx = complete_buyer_signature(tx, &payer).unwrap();
        assert_eq!(tx.signatures[1], other_signature);
        assert_eq!(tx.message, message);
    }

    #[test]
    fn test_unrelated_signer_rejected() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let tx = two_signer_transaction(&payer, &other);

        let err = complete_buyer_signature(tx, &Keypair::new()).unwrap_err();
        assert!(matches!(err, MintSaleError::Signing(_)));
    }
}
