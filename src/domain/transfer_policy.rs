//! One-directional transfer restriction for a designated holder.
//!
//! Only gates transfers the application itself initiates. A holder can
//! still transfer directly against the network.

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::models::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum TransferDecision {
    Allowed,
    Denied { reason: String },
}

impl TransferDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, TransferDecision::Allowed)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferPolicyError {
    #[error("Transfer from {restricted_sender} is only allowed to {allowed_recipient}, not {recipient}")]
    RecipientNotAllowed {
        restricted_sender: Pubkey,
        allowed_recipient: Pubkey,
        recipient: Pubkey,
    },
}

impl From<TransferPolicyError> for LedgerError {
    fn from(err: TransferPolicyError) -> Self {
        match err {
            TransferPolicyError::RecipientNotAllowed {
                restricted_sender,
                allowed_recipient,
                recipient,
            } => LedgerError::AuthorityViolation {
                restricted_sender: restricted_sender.to_string(),
                allowed_recipient: allowed_recipient.to_string(),
                recipient: recipient.to_string(),
            },
        }
    }
}

/// Allowed unless `sender` is `restricted` and `recipient` is not `allowed`.
pub fn check_transfer(
    restricted: &Pubkey,
    allowed: &Pubkey,
    sender: &Pubkey,
    recipient: &Pubkey,
) -> TransferDecision {
    if sender == restricted && recipient != allowed {
        TransferDecision::Denied {
            reason: format!(
                "{restricted} may only transfer to {allowed}, refusing transfer to {recipient}"
            ),
        }
    } else {
        TransferDecision::Allowed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPolicy {
    pub restricted_sender: Pubkey,
    pub allowed_recipient: Pubkey,
}

impl TransferPolicy {
    pub fn new(restricted_sender: Pubkey, allowed_recipient: Pubkey) -> Self {
        Self {
            restricted_sender,
            allowed_recipient,
        }
    }

    pub fn check(&self, sender: &Pubkey, recipient: &Pubkey) -> TransferDecision {
        check_transfer(
            &self.restricted_sender,
            &self.allowed_recipient,
            sender,
            recipient,
        )
    }

    /// Like [`TransferPolicy::check`] but turns a denial into an error.
    pub fn enforce(&self, sender: &Pubkey, recipient: &Pubkey) -> Result<(), TransferPolicyError> {
        match self.check(sender, recipient) {
            TransferDecision::Allowed => Ok(()),
            TransferDecision::Denied { .. } => Err(TransferPolicyError::RecipientNotAllowed {
                restricted_sender: self.restricted_sender,
                allowed_recipient: self.allowed_recipient,
                recipient: *recipient,
            }),
        }
    }
}

/// Checks against an optional policy; no policy allows everything.
pub fn enforce_optional_policy(
    policy: Option<&TransferPolicy>,
    sender: &Pubkey,
    recipient: &Pubkey,
) -> Result<(), LedgerError> {
    match policy {
        Some(policy) => Ok(policy.enforce(sender, recipient)?),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pubkey_strategy() -> impl Strategy<Value = Pubkey> {
        any::<[u8; 32]>().prop_map(Pubkey::new_from_array)
    }

    #[test]
    fn test_restricted_to_allowed_is_allowed() {
        let restricted = Pubkey::new_unique();
        let allowed = Pubkey::new_unique();
        assert_eq!(
            check_transfer(&restricted, &allowed, &restricted, &allowed),
            TransferDecision::Allowed
        );
    }

    #[test]
    fn test_restricted_to_other_is_denied() {
        let restricted = Pubkey::new_unique();
        let allowed = Pubkey::new_unique();
        let other = Pubkey::new_unique();

        match check_transfer(&restricted, &allowed, &restricted, &other) {
            TransferDecision::Denied { reason } => {
                assert!(reason.contains(&restricted.to_string()));
                assert!(reason.contains(&allowed.to_string()));
                assert!(reason.contains(&other.to_string()));
            }
            TransferDecision::Allowed => panic!("expected denial"),
        }
    }

    #[test]
    fn test_enforce_reports_authority_violation() {
        let policy = TransferPolicy::new(Pubkey::new_unique(), Pubkey::new_unique());
        let other = Pubkey::new_unique();

        let err: LedgerError = policy
            .enforce(&policy.restricted_sender, &other)
            .unwrap_err()
            .into();

        assert_eq!(
            err,
            LedgerError::AuthorityViolation {
                restricted_sender: policy.restricted_sender.to_string(),
                allowed_recipient: policy.allowed_recipient.to_string(),
                recipient: other.to_string(),
            }
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_absent_policy_allows_everything() {
        let sender = Pubkey::new_unique();
        assert!(enforce_optional_policy(None, &sender, &Pubkey::new_unique()).is_ok());

        let policy = TransferPolicy::new(sender, Pubkey::new_unique());
        assert!(enforce_optional_policy(Some(&policy), &sender, &Pubkey::new_unique()).is_err());
    }

    #[test]
    fn test_decision_serializes_with_tag() {
        let json = serde_json::to_value(TransferDecision::Denied {
            reason: "no".to_string(),
        })
        .unwrap();
        assert_eq!(json["decision"], "denied");
        assert_eq!(json["reason"], "no");
    }

    proptest! {
        #[test]
        fn test_unrestricted_senders_always_allowed(
            restricted in pubkey_strategy(),
            allowed in pubkey_strategy(),
            sender in pubkey_strategy(),
            recipient in pubkey_strategy(),
        ) {
            prop_assume!(sender != restricted);
            let policy = TransferPolicy::new(restricted, allowed);
            prop_assert!(policy.check(&sender, &recipient).is_allowed());
            prop_assert!(policy.enforce(&sender, &recipient).is_ok());
        }

        #[test]
        fn test_restricted_sender_only_reaches_allowed(
            restricted in pubkey_strategy(),
            allowed in pubkey_strategy(),
            recipient in pubkey_strategy(),
        ) {
            let policy = TransferPolicy::new(restricted, allowed);
            prop_assert_eq!(
                policy.check(&restricted, &recipient).is_allowed(),
                recipient == allowed
            );
        }
    }
}
