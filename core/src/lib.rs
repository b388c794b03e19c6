//! Escrow-and-accounting engine for fixed-price trading of non-fungible
//! assets between parties who do not trust each other.
//!
//! A verified seller places an asset into engine custody with [`Marketplace::list`],
//! a verified buyer takes it with [`Marketplace::buy`], and the seller can
//! reclaim it before sale for a fee with [`Marketplace::revoke`]. Proceeds
//! accrue per seller and are claimed on demand. Every mutating operation is
//! role-gated, pausable, reentrancy-locked, and all-or-nothing.
//!
//! External custody, badge issuance, and role membership are consumed
//! through the traits in [`interface`]; in-memory doubles live in [`mock`].

/// Role checks and the global pause switch.
pub mod access;
/// Addressing for escrowed assets.
pub mod asset;
/// The marketplace engine and its operations.
pub mod engine;
/// Structured operation records.
pub mod event;
/// Fee schedules and discounted fee math.
pub mod fees;
/// Engine-wide reentrancy lock.
pub mod guard;
/// Account and contract identifiers.
pub mod identity;
/// External collaborator contracts and persisted state.
pub mod interface;
/// Listings, seller accounts, and tiers.
pub mod listing;
/// In-memory collaborators for tests.
pub mod mock;
/// Test helpers.
pub mod utils;

pub mod error;
pub use error::{IdentityError, MarketError};

pub type Result<T> = std::result::Result<T, MarketError>;

pub use access::{AccessGate, Role};
pub use asset::AssetKey;
pub use engine::Marketplace;
pub use event::MarketEvent;
pub use fees::{FeeConfig, BPS_DIVISOR, MAX_FEE_BPS};
pub use guard::{MutationGuard, MutationPermit};
pub use identity::Id;
pub use interface::{
    acceptance_token, load_market_data, save_market_data, AcceptanceToken, AssetReceiver,
    BadgeIssuer, Custodian, MarketConfig, MarketSnapshot, RoleStore,
};
pub use listing::{Listing, SellerAccount, Tier, GOLD_SALES, SILVER_SALES};
