use thiserror::Error;

/// Marketplace engine errors.
#[derive(Debug, Error, PartialEq)]
pub enum MarketError {
    /// Listing price must be non-zero.
    #[error("listing price must be non-zero")]
    InvalidPrice,

    /// Asset contract identifier is empty.
    #[error("asset contract identifier is empty")]
    InvalidAsset,

    /// Marketplace fee above the hard cap.
    #[error("marketplace fee {0} bps exceeds the {cap} bps cap", cap = crate::fees::MAX_FEE_BPS)]
    FeeTooHigh(u16),

    /// Caller lacks the role required for the operation.
    #[error("caller lacks the required role")]
    Unauthorized,

    #[error("caller is not the listing's seller")]
    NotSeller,

    #[error("caller does not own the asset")]
    NotOwner,

    #[error("engine is not approved to move the asset")]
    NotApproved,

    /// The (contract, token) pair already has an active listing.
    #[error("asset is already listed")]
    AlreadyListed,

    #[error("listing has already been sold")]
    AlreadySold,

    #[error("listing {0} not found")]
    ListingNotFound(u64),

    #[error("payment {paid} below listing price {required}")]
    InsufficientFunds { required: u128, paid: u128 },

    #[error("payment {paid} below revoke fee {required}")]
    InsufficientRevokeFunds { required: u128, paid: u128 },

    #[error("withdrawal {requested} exceeds withdrawable balance {available}")]
    InsufficientBalance { available: u128, requested: u128 },

    #[error("withdrawal {requested} exceeds engine fund balance {available}")]
    InsufficientContractBalance { available: u128, requested: u128 },

    /// Engine is paused; all mutating operations are rejected.
    #[error("engine is paused")]
    SystemPaused,

    /// A mutating operation was entered while another is in flight.
    #[error("reentrant call rejected")]
    ReentrantCall,

    #[error("custodian error: {0}")]
    Custody(String),

    #[error("badge issuer error: {0}")]
    Issuer(String),

    #[error("identity error: {0}")]
    Identity(IdentityError),
}

/// Errors that might occur while parsing into an `Id`.
#[derive(Debug, Error, PartialEq)]
pub enum IdentityError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid base58: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("cannot parse identity from empty string")]
    EmptyIdentity,

    #[error("unsupported identity format")]
    UnsupportedFormat,
}

impl From<IdentityError> for MarketError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}
