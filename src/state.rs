use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};

#[cw_serde]
pub struct Config {
    /// Denom all prices, bids, and deposits are settled in.
    pub denom: String,
    /// Collected when a listing record is created, refunded when it is
    /// withdrawn.
    pub listing_deposit: Uint128,
    /// One-time reserve collected when a new asset denom is allowed.
    pub custody_reserve: Uint128,
}

#[cw_serde]
pub struct AssetInfo {
    /// Decimal precision of the asset denom, immutable after registration.
    pub decimals: u32,
}

#[cw_serde]
pub struct Bid {
    pub bidder: Addr,
    pub quantity: Uint128,
    pub unitary_price: Uint128,
}

#[cw_serde]
pub struct Listing {
    pub deposited: Uint128,
    pub unitary_price: Uint128,
    /// Current highest bid; `None` means no bidder.
    pub bid: Option<Bid>,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const ALLOWED_ASSETS: Map<&str, AssetInfo> = Map::new("allowed_assets"); // (denom)
pub const LISTINGS: Map<(&Addr, &str, u64), Listing> = Map::new("listings"); // (owner, asset, nonce)
pub const LISTING_COUNT: Item<u64> = Item::new("listing_count");
