use cosmwasm_std::{
    ConversionOverflowError, DivideByZeroError, OverflowError, StdError, Uint128,
};
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Payment(#[from] PaymentError),

    #[error("Denom {denom:?} cannot be used here")]
    InvalidDenom { denom: String },

    #[error("Asset decimals {decimals} exceed the supported maximum")]
    InvalidDecimals { decimals: u32 },

    #[error("Asset {denom} is already allowed")]
    AssetAlreadyAllowed { denom: String },

    #[error("Asset {denom} is not allowed")]
    AssetNotAllowed { denom: String },

    #[error("A listing already exists for this owner, asset, and nonce")]
    ListingAlreadyExists {},

    #[error("No listing exists for this owner, asset, and nonce")]
    NoSuchListing {},

    #[error("Payment is not the same as the required amount {expected}")]
    IncorrectPayment { expected: Uint128 },

    #[error("Only {available} units are deposited")]
    InsufficientDeposit { available: Uint128 },

    #[error("Bid price must exceed the current bid price {current}")]
    BidTooLow { current: Uint128 },

    #[error("No active bid on this listing")]
    NoActiveBid {},

    #[error("Cannot migrate from {previous}")]
    CannotMigrate { previous: String },

    #[error("{0}")]
    Version(#[from] semver::Error),

    #[error("{0}")]
    DivideByZeroError(#[from] DivideByZeroError),

    #[error("{0}")]
    OverflowError(#[from] OverflowError),

    #[error("{0}")]
    ConversionOverflowError(#[from] ConversionOverflowError),
}
