//! Structured records of every mutating operation, for external observers
//! and auditors. The engine appends one per operation; `Display` renders
//! the JSON form.

use serde::{Deserialize, Serialize};

use crate::asset::AssetKey;
use crate::identity::Id;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MarketEvent {
    /// An asset entered custody under a new listing.
    Listed {
        listing_id: u64,
        seller: Id,
        asset: AssetKey,
        price: u128,
    },
    /// A seller reclaimed an unsold listing; `paid` covers at least `fee`
    /// and is retained by the engine.
    Revoked {
        listing_id: u64,
        seller: Id,
        asset: AssetKey,
        fee: u128,
        paid: u128,
    },
    /// A listing sold; the seller was credited `price - fee`.
    Sold {
        listing_id: u64,
        seller: Id,
        buyer: Id,
        asset: AssetKey,
        price: u128,
        fee: u128,
    },
    SellerWithdrawal {
        seller: Id,
        amount: u128,
    },
    AdminWithdrawal {
        recipient: Id,
        amount: u128,
    },
    Paused,
    Unpaused,
    BadgeBurned {
        token_id: u64,
    },
    MarketFeeUpdated {
        bps: u16,
    },
    FeeRecipientUpdated {
        recipient: Id,
    },
}

impl std::fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let event = MarketEvent::Listed {
            listing_id: 0,
            seller: Id::from_hex("0xa11ce0").unwrap(),
            asset: AssetKey::new(Id::from_hex("0xdeadbeef").unwrap(), 7),
            price: 1_000_000,
        };
        let json = event.to_string();
        assert!(json.contains("\"event\":\"listed\""));
        let back: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
