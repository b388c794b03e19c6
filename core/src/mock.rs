//! In-memory collaborators for exercising the engine without real custody,
//! badge, or role infrastructure. NOT FOR PRODUCTION USE.
//!
//! Every double is a cheap clone over shared interior state, so tests can
//! hand one copy to the engine and keep another to seed and inspect.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::access::Role;
use crate::asset::AssetKey;
use crate::guard::MutationGuard;
use crate::identity::Id;
use crate::interface::{BadgeIssuer, Custodian, RoleStore};
use crate::{MarketError, Result};

/// Role store backed by plain sets. Grants and revocations are visible to
/// the engine immediately, matching the live-lookup contract.
#[derive(Clone, Default)]
pub struct MemoryRoleStore {
    members: Rc<RefCell<HashMap<Role, HashSet<Id>>>>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, role: Role, account: &Id) {
        self.members
            .borrow_mut()
            .entry(role)
            .or_default()
            .insert(account.clone());
    }

    pub fn revoke(&self, role: Role, account: &Id) {
        if let Some(set) = self.members.borrow_mut().get_mut(&role) {
            set.remove(account);
        }
    }
}

impl RoleStore for MemoryRoleStore {
    fn has_role(&self, role: Role, account: &Id) -> bool {
        self.members
            .borrow()
            .get(&role)
            .is_some_and(|set| set.contains(account))
    }
}

#[derive(Default)]
struct CustodyState {
    owners: HashMap<AssetKey, Id>,
    approvals: HashMap<AssetKey, HashSet<Id>>,
}

/// Custodian over an in-memory ownership table.
#[derive(Clone, Default)]
pub struct MemoryCustodian {
    state: Rc<RefCell<CustodyState>>,
    fail_transfers: Rc<Cell<bool>>,
}

impl MemoryCustodian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `asset` owned by `owner`.
    pub fn mint(&self, asset: AssetKey, owner: Id) {
        self.state.borrow_mut().owners.insert(asset, owner);
    }

    /// Approves `operator` to move `asset`.
    pub fn approve(&self, asset: AssetKey, operator: Id) {
        self.state
            .borrow_mut()
            .approvals
            .entry(asset)
            .or_default()
            .insert(operator);
    }

    pub fn owner(&self, asset: &AssetKey) -> Option<Id> {
        self.state.borrow().owners.get(asset).cloned()
    }

    /// Makes every subsequent `transfer` fail until reset.
    pub fn set_fail_transfers(&self, fail: bool) {
        self.fail_transfers.set(fail);
    }
}

impl Custodian for MemoryCustodian {
    fn owner_of(&self, asset: &AssetKey) -> Result<Id> {
        self.state
            .borrow()
            .owners
            .get(asset)
            .cloned()
            .ok_or_else(|| MarketError::Custody(format!("unknown asset {asset}")))
    }

    fn is_approved(&self, asset: &AssetKey, operator: &Id) -> Result<bool> {
        Ok(self
            .state
            .borrow()
            .approvals
            .get(asset)
            .is_some_and(|set| set.contains(operator)))
    }

    fn transfer(&self, from: &Id, to: &Id, asset: &AssetKey) -> Result<()> {
        if self.fail_transfers.get() {
            return Err(MarketError::Custody("transfer rejected".into()));
        }
        let mut state = self.state.borrow_mut();
        match state.owners.get(asset) {
            Some(owner) if owner == from => {
                state.owners.insert(asset.clone(), to.clone());
                Ok(())
            }
            Some(_) => Err(MarketError::Custody(format!("{from} does not hold {asset}"))),
            None => Err(MarketError::Custody(format!("unknown asset {asset}"))),
        }
    }
}

#[derive(Default)]
struct IssuerState {
    starters: Vec<Id>,
    silvers: Vec<Id>,
    golds: Vec<Id>,
    revoked: Vec<u64>,
}

/// Badge issuer that records every issuance.
#[derive(Clone, Default)]
pub struct MemoryBadgeIssuer {
    state: Rc<RefCell<IssuerState>>,
    fail_next: Rc<Cell<bool>>,
}

impl MemoryBadgeIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starters(&self) -> Vec<Id> {
        self.state.borrow().starters.clone()
    }

    pub fn silvers(&self) -> Vec<Id> {
        self.state.borrow().silvers.clone()
    }

    pub fn golds(&self) -> Vec<Id> {
        self.state.borrow().golds.clone()
    }

    pub fn revoked(&self) -> Vec<u64> {
        self.state.borrow().revoked.clone()
    }

    /// Makes the next issuer call fail, then resets.
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }

    fn check(&self) -> Result<()> {
        if self.fail_next.take() {
            return Err(MarketError::Issuer("issuance rejected".into()));
        }
        Ok(())
    }
}

impl BadgeIssuer for MemoryBadgeIssuer {
    fn issue_starter(&self, to: &Id) -> Result<()> {
        self.check()?;
        self.state.borrow_mut().starters.push(to.clone());
        Ok(())
    }

    fn issue_silver(&self, to: &Id) -> Result<()> {
        self.check()?;
        self.state.borrow_mut().silvers.push(to.clone());
        Ok(())
    }

    fn issue_gold(&self, to: &Id) -> Result<()> {
        self.check()?;
        self.state.borrow_mut().golds.push(to.clone());
        Ok(())
    }

    fn revoke(&self, token_id: u64) -> Result<()> {
        self.check()?;
        self.state.borrow_mut().revoked.push(token_id);
        Ok(())
    }
}

/// Custodian that tries to re-enter the engine's mutation guard during
/// every transfer, the way an adversarial asset's custody callback would,
/// and records whether the attempt was rejected.
///
/// Bind the engine's guard after construction:
/// the engine owns one clone of the probe, the test keeps another.
#[derive(Clone, Default)]
pub struct ReentrantProbe {
    custody: MemoryCustodian,
    guard: Rc<RefCell<Option<MutationGuard>>>,
    blocked: Rc<Cell<bool>>,
    entered: Rc<Cell<bool>>,
}

impl ReentrantProbe {
    pub fn new(custody: MemoryCustodian) -> Self {
        Self {
            custody,
            ..Self::default()
        }
    }

    /// Points the probe at the guard it should attack.
    pub fn bind(&self, guard: MutationGuard) {
        *self.guard.borrow_mut() = Some(guard);
    }

    /// True once a re-entry attempt was rejected.
    pub fn was_blocked(&self) -> bool {
        self.blocked.get()
    }

    /// True if a re-entry attempt ever succeeded (the guard failed).
    pub fn entered(&self) -> bool {
        self.entered.get()
    }
}

impl Custodian for ReentrantProbe {
    fn owner_of(&self, asset: &AssetKey) -> Result<Id> {
        self.custody.owner_of(asset)
    }

    fn is_approved(&self, asset: &AssetKey, operator: &Id) -> Result<bool> {
        self.custody.is_approved(asset, operator)
    }

    fn transfer(&self, from: &Id, to: &Id, asset: &AssetKey) -> Result<()> {
        if let Some(guard) = self.guard.borrow().as_ref() {
            match guard.acquire() {
                Err(MarketError::ReentrantCall) => self.blocked.set(true),
                Err(_) => {}
                Ok(_permit) => self.entered.set(true),
            }
        }
        self.custody.transfer(from, to, asset)
    }
}
