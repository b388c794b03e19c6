//! Role checks and the global pause switch.
//!
//! Role membership lives in an external [`RoleStore`]; the gate consults it
//! on every check rather than caching, so revocations take effect on the
//! next call.

use serde::{Deserialize, Serialize};

use crate::identity::Id;
use crate::interface::RoleStore;
use crate::{MarketError, Result};

/// Roles recognized by the engine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    VerifiedParticipant,
}

/// Gate every mutating operation passes before touching state.
pub struct AccessGate {
    roles: Box<dyn RoleStore>,
    paused: bool,
}

impl AccessGate {
    pub fn new(roles: Box<dyn RoleStore>) -> Self {
        Self {
            roles,
            paused: false,
        }
    }

    /// Rebuilds a gate from a persisted pause flag.
    pub fn with_paused(roles: Box<dyn RoleStore>, paused: bool) -> Self {
        Self { roles, paused }
    }

    pub fn require_admin(&self, caller: &Id) -> Result<()> {
        if !self.roles.has_role(Role::Administrator, caller) {
            return Err(MarketError::Unauthorized);
        }
        Ok(())
    }

    pub fn require_verified(&self, caller: &Id) -> Result<()> {
        if !self.roles.has_role(Role::VerifiedParticipant, caller) {
            return Err(MarketError::Unauthorized);
        }
        Ok(())
    }

    pub fn require_not_paused(&self) -> Result<()> {
        if self.paused {
            return Err(MarketError::SystemPaused);
        }
        Ok(())
    }

    /// Halts all mutating operations. Safe to call when already paused.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes mutating operations. Safe to call when already running.
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryRoleStore;

    fn id(s: &str) -> Id {
        Id::from_hex(s).unwrap()
    }

    #[test]
    fn role_checks_are_live() {
        let store = MemoryRoleStore::new();
        let alice = id("0xa11ce0");
        store.grant(Role::VerifiedParticipant, &alice);

        let gate = AccessGate::new(Box::new(store.clone()));
        assert!(gate.require_verified(&alice).is_ok());
        assert_eq!(gate.require_admin(&alice), Err(MarketError::Unauthorized));

        // revocation is visible without rebuilding the gate
        store.revoke(Role::VerifiedParticipant, &alice);
        assert_eq!(gate.require_verified(&alice), Err(MarketError::Unauthorized));
    }

    #[test]
    fn pause_toggles_idempotently() {
        let gate = &mut AccessGate::new(Box::new(MemoryRoleStore::new()));
        assert!(gate.require_not_paused().is_ok());
        gate.pause();
        gate.pause();
        assert_eq!(gate.require_not_paused(), Err(MarketError::SystemPaused));
        gate.unpause();
        gate.unpause();
        assert!(gate.require_not_paused().is_ok());
    }
}
