//! The marketplace engine: listing registry, escrow accounting, and the
//! operations composing them.
//!
//! Every mutating operation runs as one atomic step: access gate first,
//! then the mutation guard, then validation, then collaborator calls, and
//! only once those succeed the state commit. A failure anywhere leaves no
//! observable state change.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info};

use crate::access::AccessGate;
use crate::asset::AssetKey;
use crate::event::MarketEvent;
use crate::fees::FeeConfig;
use crate::guard::MutationGuard;
use crate::identity::Id;
use crate::interface::{
    acceptance_token, AcceptanceToken, AssetReceiver, BadgeIssuer, Custodian, MarketConfig,
    MarketSnapshot, RoleStore,
};
use crate::listing::{Listing, SellerAccount, Tier, GOLD_SALES, SILVER_SALES};
use crate::{MarketError, Result};

/// Escrow-and-accounting engine for fixed-price trading of non-fungible
/// assets between mutually untrusting parties.
pub struct Marketplace {
    config: MarketConfig,
    gate: AccessGate,
    guard: MutationGuard,
    custodian: Box<dyn Custodian>,
    issuer: Box<dyn BadgeIssuer>,
    listings: BTreeMap<u64, Listing>,
    sellers: HashMap<Id, SellerAccount>,
    listed: HashSet<AssetKey>,
    next_listing_id: u64,
    funds: u128,
    events: Vec<MarketEvent>,
}

impl Marketplace {
    pub fn new(
        config: MarketConfig,
        roles: Box<dyn RoleStore>,
        custodian: Box<dyn Custodian>,
        issuer: Box<dyn BadgeIssuer>,
    ) -> Self {
        Self {
            config,
            gate: AccessGate::new(roles),
            guard: MutationGuard::new(),
            custodian,
            issuer,
            listings: BTreeMap::new(),
            sellers: HashMap::new(),
            listed: HashSet::new(),
            next_listing_id: 0,
            funds: 0,
            events: Vec::new(),
        }
    }

    /// Rebuilds an engine around persisted state and fresh collaborators.
    pub fn restore(
        snapshot: MarketSnapshot,
        roles: Box<dyn RoleStore>,
        custodian: Box<dyn Custodian>,
        issuer: Box<dyn BadgeIssuer>,
    ) -> Self {
        Self {
            gate: AccessGate::with_paused(roles, snapshot.paused),
            guard: MutationGuard::new(),
            custodian,
            issuer,
            listings: snapshot.listings,
            sellers: snapshot.sellers.into_iter().collect(),
            listed: snapshot.listed.into_iter().collect(),
            next_listing_id: snapshot.next_listing_id,
            funds: snapshot.funds,
            events: Vec::new(),
            config: snapshot.config,
        }
    }

    /// Exports all persisted state.
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            config: self.config.clone(),
            paused: self.gate.is_paused(),
            next_listing_id: self.next_listing_id,
            funds: self.funds,
            listings: self.listings.clone(),
            sellers: self.sellers.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            listed: self.listed.iter().cloned().collect(),
        }
    }

    // ---- listing registry ----

    /// Places `asset` into custody under a new listing at `price`.
    ///
    /// The seller's first sale-eligible listing also requests a starting
    /// badge from the issuer. Returns the new listing id.
    pub fn list(&mut self, seller: &Id, asset: AssetKey, price: u128) -> Result<u64> {
        self.gate.require_not_paused()?;
        self.gate.require_verified(seller)?;
        let _permit = self.guard.acquire()?;

        if price == 0 {
            return Err(MarketError::InvalidPrice);
        }
        asset.validate()?;
        if self.listed.contains(&asset) {
            return Err(MarketError::AlreadyListed);
        }
        if self.custodian.owner_of(&asset)? != *seller {
            return Err(MarketError::NotOwner);
        }
        if !self.custodian.is_approved(&asset, &self.config.operator)? {
            return Err(MarketError::NotApproved);
        }

        let first_listing = self
            .sellers
            .get(seller)
            .map_or(true, |a| a.sale_count == 0 && !a.starter_issued);

        if first_listing {
            self.issuer.issue_starter(seller)?;
        }
        self.custodian.transfer(seller, &self.config.operator, &asset)?;

        let id = self.next_listing_id;
        self.next_listing_id += 1;
        self.listings.insert(
            id,
            Listing {
                id,
                seller: seller.clone(),
                asset: asset.clone(),
                price,
                sold: false,
            },
        );
        self.listed.insert(asset.clone());
        if first_listing {
            self.sellers.entry(seller.clone()).or_default().starter_issued = true;
        }

        info!(listing_id = id, %seller, %asset, price, "asset listed");
        self.events.push(MarketEvent::Listed {
            listing_id: id,
            seller: seller.clone(),
            asset,
            price,
        });
        Ok(id)
    }

    /// Returns an unsold listing's asset to its seller for a fee.
    ///
    /// The fee is the revoke rate discounted by the caller's current tier;
    /// the full `paid` amount is retained by the engine, outside seller
    /// withdrawable balances.
    pub fn revoke(&mut self, listing_id: u64, caller: &Id, paid: u128) -> Result<()> {
        self.gate.require_not_paused()?;
        self.gate.require_verified(caller)?;
        let _permit = self.guard.acquire()?;

        let listing = self
            .listings
            .get(&listing_id)
            .ok_or(MarketError::ListingNotFound(listing_id))?;
        if listing.seller != *caller {
            return Err(MarketError::NotSeller);
        }
        if listing.sold {
            return Err(MarketError::AlreadySold);
        }

        let tier = self.sellers.get(caller).map_or(Tier::None, |a| a.tier);
        let discount = tier.revoke_discount_bps(self.config.fees.revoke_fee_bps());
        let fee = self.config.fees.revoke_fee(listing.price, discount);
        if paid < fee {
            return Err(MarketError::InsufficientRevokeFunds {
                required: fee,
                paid,
            });
        }
        let asset = listing.asset.clone();

        self.custodian.transfer(&self.config.operator, caller, &asset)?;

        self.listings.remove(&listing_id);
        self.listed.remove(&asset);
        self.funds = self.funds.saturating_add(paid);

        info!(listing_id, seller = %caller, %asset, fee, paid, "listing revoked");
        self.events.push(MarketEvent::Revoked {
            listing_id,
            seller: caller.clone(),
            asset,
            fee,
            paid,
        });
        Ok(())
    }

    /// Buys a listing at its fixed price. Overpayment is accepted and not
    /// refunded.
    ///
    /// Credits `price - fee` to the seller, advances the seller's sale
    /// count, and upgrades the tier when a threshold is crossed. The Gold
    /// check runs first; at most one upgrade happens per call.
    pub fn buy(&mut self, listing_id: u64, buyer: &Id, paid: u128) -> Result<()> {
        self.gate.require_not_paused()?;
        self.gate.require_verified(buyer)?;
        let _permit = self.guard.acquire()?;

        let listing = self
            .listings
            .get_mut(&listing_id)
            .ok_or(MarketError::ListingNotFound(listing_id))?;
        if listing.sold {
            return Err(MarketError::AlreadySold);
        }
        if paid < listing.price {
            return Err(MarketError::InsufficientFunds {
                required: listing.price,
                paid,
            });
        }

        let seller = listing.seller.clone();
        let asset = listing.asset.clone();
        let price = listing.price;
        // Buy-side discounting is not supported.
        let fee = self.config.fees.market_fee(price, 0);

        let (sale_count, tier) = self
            .sellers
            .get(&seller)
            .map_or((0, Tier::None), |a| (a.sale_count, a.tier));
        let new_count = sale_count + 1;
        let upgrade = if new_count >= GOLD_SALES && tier < Tier::Gold {
            Some(Tier::Gold)
        } else if new_count >= SILVER_SALES && tier < Tier::Silver {
            Some(Tier::Silver)
        } else {
            None
        };

        match upgrade {
            Some(Tier::Gold) => self.issuer.issue_gold(&seller)?,
            Some(Tier::Silver) => self.issuer.issue_silver(&seller)?,
            _ => {}
        }
        self.custodian.transfer(&self.config.operator, buyer, &asset)?;

        listing.sold = true;
        let account = self.sellers.entry(seller.clone()).or_default();
        account.sale_count = new_count;
        if let Some(tier) = upgrade {
            account.tier = tier;
        }
        account.withdrawable = account.withdrawable.saturating_add(price - fee);
        self.funds = self.funds.saturating_add(paid);
        if self.config.clear_index_on_sale {
            self.listed.remove(&asset);
        }

        info!(listing_id, %seller, %buyer, %asset, price, fee, "listing sold");
        self.events.push(MarketEvent::Sold {
            listing_id,
            seller,
            buyer: buyer.clone(),
            asset,
            price,
            fee,
        });
        Ok(())
    }

    // ---- escrow accounting ----

    /// Pays out up to the seller's withdrawable balance. Only the seller may
    /// withdraw their own proceeds.
    pub fn withdraw_seller(&mut self, caller: &Id, seller: &Id, amount: u128) -> Result<()> {
        self.gate.require_not_paused()?;
        let _permit = self.guard.acquire()?;

        if caller != seller {
            return Err(MarketError::NotSeller);
        }
        let available = self.sellers.get(seller).map_or(0, |a| a.withdrawable);
        if amount > available {
            return Err(MarketError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        // Balance falls before the payout leaves the engine.
        if let Some(account) = self.sellers.get_mut(seller) {
            account.withdrawable -= amount;
        }
        self.funds = self.funds.saturating_sub(amount);

        info!(%seller, amount, "seller withdrawal");
        self.events.push(MarketEvent::SellerWithdrawal {
            seller: seller.clone(),
            amount,
        });
        Ok(())
    }

    /// Pays collected fees out of the engine's fund balance to the fee
    /// recipient. Checks the raw balance only; outstanding seller balances
    /// are not reserved.
    pub fn withdraw_admin(&mut self, caller: &Id, amount: u128) -> Result<()> {
        self.gate.require_not_paused()?;
        self.gate.require_admin(caller)?;
        let _permit = self.guard.acquire()?;

        if amount > self.funds {
            return Err(MarketError::InsufficientContractBalance {
                available: self.funds,
                requested: amount,
            });
        }
        self.funds -= amount;

        let recipient = self.config.fees.fee_recipient().clone();
        info!(%recipient, amount, "admin withdrawal");
        self.events.push(MarketEvent::AdminWithdrawal { recipient, amount });
        Ok(())
    }

    // ---- administration ----

    /// Halts all mutating operations until [`Self::unpause`].
    pub fn pause(&mut self, caller: &Id) -> Result<()> {
        self.gate.require_admin(caller)?;
        let _permit = self.guard.acquire()?;

        self.gate.pause();
        info!("engine paused");
        self.events.push(MarketEvent::Paused);
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Id) -> Result<()> {
        self.gate.require_admin(caller)?;
        let _permit = self.guard.acquire()?;

        self.gate.unpause();
        info!("engine unpaused");
        self.events.push(MarketEvent::Unpaused);
        Ok(())
    }

    /// Burns a previously issued badge through the issuer.
    pub fn burn_badge(&mut self, caller: &Id, token_id: u64) -> Result<()> {
        self.gate.require_admin(caller)?;
        let _permit = self.guard.acquire()?;

        self.issuer.revoke(token_id)?;

        info!(token_id, "badge burned");
        self.events.push(MarketEvent::BadgeBurned { token_id });
        Ok(())
    }

    /// Updates the marketplace fee rate, subject to the bps cap. The revoke
    /// rate is fixed at construction and has no setter.
    pub fn set_market_fee(&mut self, caller: &Id, bps: u16) -> Result<()> {
        self.gate.require_admin(caller)?;
        let _permit = self.guard.acquire()?;

        self.config.fees.set_market_fee_bps(bps)?;

        info!(bps, "marketplace fee updated");
        self.events.push(MarketEvent::MarketFeeUpdated { bps });
        Ok(())
    }

    pub fn set_fee_recipient(&mut self, caller: &Id, recipient: Id) -> Result<()> {
        self.gate.require_admin(caller)?;
        let _permit = self.guard.acquire()?;

        self.config.fees.set_fee_recipient(recipient.clone());

        info!(%recipient, "fee recipient updated");
        self.events.push(MarketEvent::FeeRecipientUpdated { recipient });
        Ok(())
    }

    // ---- queries ----

    pub fn listing(&self, listing_id: u64) -> Option<&Listing> {
        self.listings.get(&listing_id)
    }

    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    pub fn seller_withdrawable(&self, seller: &Id) -> u128 {
        self.sellers.get(seller).map_or(0, |a| a.withdrawable)
    }

    pub fn seller_account(&self, seller: &Id) -> Option<&SellerAccount> {
        self.sellers.get(seller)
    }

    /// Whether the (contract, token) pair currently occupies the duplicate
    /// index.
    pub fn is_listed(&self, asset: &AssetKey) -> bool {
        self.listed.contains(asset)
    }

    /// The engine's own fund balance.
    pub fn funds(&self) -> u128 {
        self.funds
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    pub fn fee_config(&self) -> &FeeConfig {
        &self.config.fees
    }

    /// The engine-wide reentrancy guard. Clones share the same busy flag.
    pub fn guard(&self) -> &MutationGuard {
        &self.guard
    }

    /// Events recorded since construction or the last [`Self::drain_events`].
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        self.events.drain(..).collect()
    }
}

impl AssetReceiver for Marketplace {
    /// Answers custody deliveries with the fixed acceptance token.
    fn on_asset_received(&self, operator: &Id, from: &Id, asset: &AssetKey) -> AcceptanceToken {
        debug!(%operator, %from, %asset, "asset received into custody");
        acceptance_token()
    }
}

impl std::fmt::Debug for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marketplace")
            .field("listings", &self.listings.len())
            .field("sellers", &self.sellers.len())
            .field("funds", &self.funds)
            .field("paused", &self.gate.is_paused())
            .finish_non_exhaustive()
    }
}
