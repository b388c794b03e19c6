//! Addressing for escrowed non-fungible assets.

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::identity::Id;
use crate::{MarketError, Result};

/// One non-fungible asset: a token number under an asset contract.
///
/// A key may appear in at most one active listing at a time; the engine's
/// duplicate index enforces this.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetKey {
    /// Contract (collection) the token belongs to.
    pub contract: Id,
    /// Token number within the contract.
    pub token: u64,
}

impl AssetKey {
    pub fn new(contract: Id, token: u64) -> Self {
        Self { contract, token }
    }

    /// Rejects keys whose contract identifier is empty.
    pub fn validate(&self) -> Result<()> {
        if self.contract.is_empty() {
            return Err(MarketError::InvalidAsset);
        }
        Ok(())
    }
}

impl std::fmt::Display for AssetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.contract, self.token)
    }
}

impl std::str::FromStr for AssetKey {
    type Err = MarketError;

    /// Parses `contract:token`, e.g. `0xdeadbeef:7`.
    fn from_str(s: &str) -> Result<Self> {
        let (contract, token) = s
            .rsplit_once(':')
            .ok_or(MarketError::Identity(IdentityError::UnsupportedFormat))?;
        let contract = contract
            .parse::<Id>()
            .map_err(|_| IdentityError::UnsupportedFormat)?;
        let token = token
            .parse::<u64>()
            .map_err(|_| MarketError::Identity(IdentityError::UnsupportedFormat))?;
        Ok(Self { contract, token })
    }
}
