//! Engine-wide reentrancy lock.
//!
//! One busy flag covers the whole engine, not individual listings: any
//! mutating operation entered while another is in flight fails with
//! [`MarketError::ReentrantCall`] instead of blocking. The permit releases
//! the flag on every exit path, including early returns through `?`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{MarketError, Result};

/// The busy flag guarding all mutating engine operations.
#[derive(Debug, Clone, Default)]
pub struct MutationGuard {
    busy: Arc<AtomicBool>,
}

impl MutationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims the flag, failing if a mutation is in flight.
    pub fn acquire(&self) -> Result<MutationPermit> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(MarketError::ReentrantCall);
        }
        Ok(MutationPermit {
            busy: Arc::clone(&self.busy),
        })
    }

    /// True while a mutating operation holds the permit.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of exclusive mutation rights; clears the flag when dropped.
#[derive(Debug)]
pub struct MutationPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for MutationPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reentry_is_rejected_until_release() {
        let guard = MutationGuard::new();
        let permit = guard.acquire().unwrap();
        assert!(guard.is_busy());
        assert_eq!(guard.acquire().unwrap_err(), MarketError::ReentrantCall);
        drop(permit);
        assert!(!guard.is_busy());
        assert!(guard.acquire().is_ok());
    }

    #[test]
    fn error_paths_release_the_flag() {
        fn failing_op(guard: &MutationGuard) -> Result<()> {
            let _permit = guard.acquire()?;
            Err(MarketError::InvalidPrice)
        }

        let guard = MutationGuard::new();
        assert!(failing_op(&guard).is_err());
        assert!(!guard.is_busy());
    }

    #[test]
    fn clones_share_one_flag() {
        let guard = MutationGuard::new();
        let alias = guard.clone();
        let _permit = guard.acquire().unwrap();
        assert_eq!(alias.acquire().unwrap_err(), MarketError::ReentrantCall);
    }
}
