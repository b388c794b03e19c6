//! Marketplace and revoke fee computation.
//!
//! All fees are expressed in basis points of the listing price. The math
//! never fails: a discount at or above the fee rate yields a zero fee, and
//! a price large enough to overflow the multiplication clamps to a zero fee
//! instead of aborting the operation.

use serde::{Deserialize, Serialize};

use crate::identity::Id;
use crate::{MarketError, Result};

/// Basis-points denominator.
pub const BPS_DIVISOR: u128 = 10_000;

/// Hard cap on the marketplace fee: 10%.
pub const MAX_FEE_BPS: u16 = 1_000;

/// Fee schedule and recipient, owned by the administrator domain.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeeConfig {
    market_fee_bps: u16,
    revoke_fee_bps: u16,
    fee_recipient: Id,
}

impl FeeConfig {
    /// Builds a schedule; the marketplace fee must not exceed [`MAX_FEE_BPS`].
    /// The revoke fee is fixed for the lifetime of the config.
    pub fn new(market_fee_bps: u16, revoke_fee_bps: u16, fee_recipient: Id) -> Result<Self> {
        if market_fee_bps > MAX_FEE_BPS {
            return Err(MarketError::FeeTooHigh(market_fee_bps));
        }
        Ok(Self {
            market_fee_bps,
            revoke_fee_bps,
            fee_recipient,
        })
    }

    pub fn market_fee_bps(&self) -> u16 {
        self.market_fee_bps
    }

    pub fn revoke_fee_bps(&self) -> u16 {
        self.revoke_fee_bps
    }

    pub fn fee_recipient(&self) -> &Id {
        &self.fee_recipient
    }

    /// Updates the marketplace fee, keeping the [`MAX_FEE_BPS`] invariant.
    pub fn set_market_fee_bps(&mut self, bps: u16) -> Result<()> {
        if bps > MAX_FEE_BPS {
            return Err(MarketError::FeeTooHigh(bps));
        }
        self.market_fee_bps = bps;
        Ok(())
    }

    pub fn set_fee_recipient(&mut self, recipient: Id) {
        self.fee_recipient = recipient;
    }

    /// Marketplace fee on a sale at `price`, after `discount_bps`.
    pub fn market_fee(&self, price: u128, discount_bps: u16) -> u128 {
        discounted_fee(price, self.market_fee_bps, discount_bps)
    }

    /// Revoke fee for reclaiming a listing at `price`, after `discount_bps`.
    pub fn revoke_fee(&self, price: u128, discount_bps: u16) -> u128 {
        discounted_fee(price, self.revoke_fee_bps, discount_bps)
    }
}

/// `price * (fee_bps - discount_bps) / 10_000`, with the discount applied
/// before the multiplication.
///
/// A discount at or above `fee_bps` is a full waiver. A price that would
/// overflow `price * effective_bps` clamps to a zero fee; oversized trades
/// stay executable at the cost of fee precision.
pub fn discounted_fee(price: u128, fee_bps: u16, discount_bps: u16) -> u128 {
    if discount_bps >= fee_bps {
        return 0;
    }
    let effective = u128::from(fee_bps - discount_bps);
    if price > u128::MAX / effective {
        return 0;
    }
    price * effective / BPS_DIVISOR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FeeConfig {
        FeeConfig::new(250, 100, Id::from_hex("0xfeed").unwrap()).unwrap()
    }

    #[test]
    fn example_rates() {
        let fees = config();
        assert_eq!(fees.market_fee(1_000_000, 0), 25_000);
        assert_eq!(fees.revoke_fee(1_000_000, 0), 10_000);
        // silver: half the revoke rate waived
        assert_eq!(fees.revoke_fee(1_000_000, 50), 5_000);
        // gold: full waiver
        assert_eq!(fees.revoke_fee(1_000_000, 100), 0);
    }

    #[test]
    fn fee_never_exceeds_price() {
        let fees = config();
        for price in [0u128, 1, 9, 10_000, 1_000_000, u128::MAX / 2, u128::MAX] {
            for discount in [0u16, 100, 250] {
                assert!(fees.market_fee(price, discount) <= price);
            }
        }
    }

    #[test]
    fn discount_is_monotonic() {
        let fees = config();
        let price = 123_456_789;
        let mut last = u128::MAX;
        for discount in 0..=300u16 {
            let fee = fees.market_fee(price, discount);
            assert!(fee <= last);
            last = fee;
        }
        assert_eq!(fees.market_fee(price, 250), 0);
        assert_eq!(fees.market_fee(price, 300), 0);
    }

    #[test]
    fn overflow_clamps_to_zero() {
        assert_eq!(discounted_fee(u128::MAX, 250, 0), 0);
        // boundary: the largest price that still multiplies safely
        let max_safe = u128::MAX / 250;
        assert_eq!(discounted_fee(max_safe, 250, 0), max_safe * 250 / BPS_DIVISOR);
        assert_eq!(discounted_fee(max_safe + 1, 250, 0), 0);
    }

    #[test]
    fn market_fee_cap_is_enforced() {
        let recipient = Id::from_hex("0xfeed").unwrap();
        assert_eq!(
            FeeConfig::new(1_001, 100, recipient.clone()),
            Err(MarketError::FeeTooHigh(1_001))
        );
        let mut fees = FeeConfig::new(MAX_FEE_BPS, 100, recipient).unwrap();
        assert_eq!(fees.set_market_fee_bps(2_000), Err(MarketError::FeeTooHigh(2_000)));
        fees.set_market_fee_bps(0).unwrap();
        assert_eq!(fees.market_fee(1_000_000, 0), 0);
    }
}
