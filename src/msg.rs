use crate::state::{AssetInfo, Bid, Config};
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128};

#[cw_serde]
pub struct InstantiateMsg {
    pub denom: String,
    pub listing_deposit: Uint128,
    pub custody_reserve: Uint128,
}

#[cw_serde]
pub enum ExecuteMsg {
    AllowAsset {
        denom: String,
        decimals: u32,
    },
    FirstDeposit {
        asset: String,
        nonce: u64,
        unitary_price: Uint128,
    },
    Deposit {
        asset: String,
        nonce: u64,
    },
    SetPrice {
        asset: String,
        nonce: u64,
        unitary_price: Uint128,
    },
    Buy {
        owner: String,
        asset: String,
        nonce: u64,
        quantity: Uint128,
    },
    Bid {
        owner: String,
        asset: String,
        nonce: u64,
        quantity: Uint128,
        unitary_price: Uint128,
    },
    AcceptBid {
        asset: String,
        nonce: u64,
    },
    Withdraw {
        asset: String,
        nonce: u64,
    },
}

#[cw_serde]
pub struct ListingResponse {
    pub owner: Addr,
    pub asset: String,
    pub nonce: u64,
    pub deposited: Uint128,
    pub unitary_price: Uint128,
    pub bid: Option<Bid>,
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    GetConfig {},
    #[returns(AssetInfo)]
    GetAllowedAsset { denom: String },
    #[returns(ListingResponse)]
    GetListing {
        owner: String,
        asset: String,
        nonce: u64,
    },
    #[returns(Vec<ListingResponse>)]
    GetListingsByOwner {
        owner: String,
        from_index: Option<u64>,
        limit: Option<u64>,
    },
    #[returns(Vec<ListingResponse>)]
    GetAllListings {
        from_index: Option<u64>,
        limit: Option<u64>,
    },
    #[returns(u64)]
    GetListingCount {},
}

#[cw_serde]
pub struct MigrateMsg {}
