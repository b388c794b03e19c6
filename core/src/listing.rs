//! Listings, seller accounts, and seller tiers.

use serde::{Deserialize, Serialize};

use crate::asset::AssetKey;
use crate::identity::Id;

/// Completed sales at which a seller earns Silver.
pub const SILVER_SALES: u64 = 10;

/// Completed sales at which a seller earns Gold.
pub const GOLD_SALES: u64 = 20;

/// An offer to sell one asset at a fixed price, held in engine custody.
///
/// Created by `list`; either marked sold by `buy` (permanent) or removed by
/// `revoke` before sale. Never mutated once sold.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Unique, monotonically assigned, never reused.
    pub id: u64,
    pub seller: Id,
    pub asset: AssetKey,
    /// Fixed sale price; always non-zero.
    pub price: u128,
    pub sold: bool,
}

/// Earned seller status. Tiers only ever go up.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    None,
    Silver,
    Gold,
}

impl Tier {
    /// Portion of the revoke fee rate this tier waives: Gold waives all of
    /// it, Silver half, None nothing.
    pub fn revoke_discount_bps(self, revoke_fee_bps: u16) -> u16 {
        match self {
            Self::Gold => revoke_fee_bps,
            Self::Silver => revoke_fee_bps / 2,
            Self::None => 0,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Silver => "silver",
            Self::Gold => "gold",
        };
        write!(f, "{name}")
    }
}

/// Per-seller sale counters, tier, and unclaimed proceeds.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerAccount {
    /// Completed sales; monotonic non-decreasing.
    pub sale_count: u64,
    pub tier: Tier,
    /// Proceeds owed from completed sales, claimable on demand.
    pub withdrawable: u128,
    /// Set once the starting badge has been requested, so later pre-sale
    /// listings do not request it again.
    pub starter_issued: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_ordering() {
        assert!(Tier::None < Tier::Silver);
        assert!(Tier::Silver < Tier::Gold);
        assert_eq!(Tier::default(), Tier::None);
    }

    #[test]
    fn revoke_discounts() {
        assert_eq!(Tier::None.revoke_discount_bps(100), 0);
        assert_eq!(Tier::Silver.revoke_discount_bps(100), 50);
        assert_eq!(Tier::Gold.revoke_discount_bps(100), 100);
        // odd rates round the silver waiver down
        assert_eq!(Tier::Silver.revoke_discount_bps(75), 37);
    }
}
