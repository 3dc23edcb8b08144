//! Prevents concurrent broadcasts for the same mint.
//!
//! A second create against an account that already exists is rejected by
//! the network as a duplicate, so only one broadcast per mint may be in
//! flight at a time.

use std::sync::Arc;

use dashmap::DashSet;
use log::debug;
use solana_sdk::pubkey::Pubkey;

use super::MintSaleError;

#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<DashSet<Pubkey>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `mint` as in flight until the returned permit is dropped.
    pub fn try_acquire(&self, mint: Pubkey) -> Result<SubmissionPermit, MintSaleError> {
        if !self.in_flight.insert(mint) {
            return Err(MintSaleError::SubmissionInFlight(mint));
        }
        debug!("Acquired submission permit for mint {}", mint);
        Ok(SubmissionPermit {
            in_flight: Arc::clone(&self.in_flight),
            mint,
        })
    }

    pub fn is_in_flight(&self, mint: &Pubkey) -> bool {
        self.in_flight.contains(mint)
    }
}

#[derive(Debug)]
pub struct SubmissionPermit {
    in_flight: Arc<DashSet<Pubkey>>,
    mint: Pubkey,
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        self.in_flight.remove(&self.mint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_for_same_mint_fails() {
        let guard = SubmissionGuard::new();
        let mint = Pubkey::new_unique();

        let _permit = guard.try_acquire(mint).unwrap();
        assert!(guard.is_in_flight(&mint));
        assert!(matches!(
            guard.try_acquire(mint),
            Err(MintSaleError::SubmissionInFlight(m)) if m == mint
        ));
    }

    #[test]
    fn test_permit_released_on_drop() {
        let guard = SubmissionGuard::new();
        let mint = Pubkey::new_unique();

        drop(guard.try_acquire(mint).unwrap());
        assert!(!guard.is_in_flight(&mint));
        assert!(guard.try_acquire(mint).is_ok());
    }

    #[test]
    fn test_different_mints_do_not_conflict() {
        let guard = SubmissionGuard::new();
        let _a = guard.try_acquire(Pubkey::new_unique()).unwrap();
        let _b = guard.try_acquire(Pubkey::new_unique()).unwrap();
    }

    #[test]
    fn test_clones_share_state() {
        let guard = SubmissionGuard::new();
        let clone = guard.clone();
        let mint = Pubkey::new_unique();

        let _permit = guard.try_acquire(mint).unwrap();
        assert!(clone.try_acquire(mint).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_only_one_concurrent_acquirer_wins() {
        let guard = SubmissionGuard::new();
        let mint = Pubkey::new_unique();
        let barrier = Arc::new(tokio::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    barrier.wait().await;
                    let permit = guard.try_acquire(mint);
                    let won = permit.is_ok();
                    // Hold the permit until every task has tried.
                    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                    drop(permit);
                    won
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
