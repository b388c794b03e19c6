//! Contracts this engine consumes from external collaborators, the inbound
//! custody callback it answers, and the persisted state layout.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use sha2::{Digest, Sha256};

use crate::access::Role;
use crate::asset::AssetKey;
use crate::fees::FeeConfig;
use crate::identity::Id;
use crate::listing::{Listing, SellerAccount};
use crate::Result;

/// Asset-ownership/custody standard the engine escrows through.
///
/// `transfer` must either complete atomically or fail; a failure aborts the
/// calling engine operation.
pub trait Custodian {
    fn owner_of(&self, asset: &AssetKey) -> Result<Id>;

    /// Whether `operator` may move `asset` on the owner's behalf.
    fn is_approved(&self, asset: &AssetKey, operator: &Id) -> Result<bool>;

    fn transfer(&self, from: &Id, to: &Id, asset: &AssetKey) -> Result<()>;
}

/// Badge/achievement token issuer. Issuance is fire-and-forget except that
/// a failure aborts the calling engine operation.
pub trait BadgeIssuer {
    fn issue_starter(&self, to: &Id) -> Result<()>;

    fn issue_silver(&self, to: &Id) -> Result<()>;

    fn issue_gold(&self, to: &Id) -> Result<()>;

    /// Admin-triggered burn of a previously issued badge.
    fn revoke(&self, token_id: u64) -> Result<()>;
}

/// Role-membership store consulted by the access gate. Lookups are always
/// live; the engine never caches membership.
pub trait RoleStore {
    fn has_role(&self, role: Role, account: &Id) -> bool;
}

/// Inbound custody callback: custodians deliver assets to a receiver and
/// require the fixed acceptance token in response before completing the
/// transfer.
pub trait AssetReceiver {
    fn on_asset_received(&self, operator: &Id, from: &Id, asset: &AssetKey) -> AcceptanceToken;
}

/// Acknowledgement value an [`AssetReceiver`] answers with.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceToken(#[serde_as(as = "Hex")] pub [u8; 32]);

/// The fixed token this engine returns from `on_asset_received`.
pub fn acceptance_token() -> AcceptanceToken {
    AcceptanceToken(Sha256::digest(b"tradevault-core/on-asset-received/v1").into())
}

/// Engine construction parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    /// The engine's own account; custody holder for escrowed assets.
    pub operator: Id,

    /// Fee schedule and recipient.
    pub fees: FeeConfig,

    /// Clear the duplicate index when a listing sells, so the asset can be
    /// listed again later. Defaults to false: a sold asset stays indexed
    /// and the (contract, token) pair can never be re-listed.
    #[serde(default)]
    pub clear_index_on_sale: bool,
}

/// Serializable image of all persisted engine state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarketSnapshot {
    pub config: MarketConfig,
    pub paused: bool,
    pub next_listing_id: u64,
    /// The engine's own fund balance.
    pub funds: u128,
    /// Listing table keyed by listing id.
    pub listings: BTreeMap<u64, Listing>,
    /// Seller accounts keyed by identity.
    pub sellers: BTreeMap<Id, SellerAccount>,
    /// Duplicate index over (contract, token) pairs.
    pub listed: BTreeSet<AssetKey>,
}

/// Reads a JSON-encoded file from the given `path` and deserializes into type `T`.
///
/// # Errors
///
/// Returns an `anyhow::Error` if the file cannot be opened, read, or parsed.
pub fn load_market_data<P, T>(path: P) -> anyhow::Result<T>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("loading market data: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("parsing JSON from {:?}", path))
}

/// Writes `data` (serializable) as pretty-printed JSON to the given `path`.
///
/// # Errors
///
/// Returns an `anyhow::Error` if the file cannot be created or data cannot be serialized.
pub fn save_market_data<P, T>(path: P, data: &T) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating file {:?}", path))?;
    serde_json::to_writer_pretty(file, data)
        .with_context(|| format!("serializing to JSON to {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceptance_token_is_stable() {
        assert_eq!(acceptance_token(), acceptance_token());
        let json = serde_json::to_string(&acceptance_token()).unwrap();
        // 32 bytes of hex plus quotes
        assert_eq!(json.len(), 66);
        let back: AcceptanceToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, acceptance_token());
    }

    #[test]
    fn config_defaults_keep_sold_assets_indexed() {
        let json = r#"{
            "operator": "0x0e",
            "fees": {
                "market_fee_bps": 250,
                "revoke_fee_bps": 100,
                "fee_recipient": "0xfeed"
            }
        }"#;
        let config: MarketConfig = serde_json::from_str(json).unwrap();
        assert!(!config.clear_index_on_sale);
        assert_eq!(config.fees.market_fee_bps(), 250);
    }
}
