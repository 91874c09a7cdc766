#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, CosmosMsg, Deps, DepsMut, Env, MessageInfo, Order, Response,
    StdResult, Storage, Uint128,
};
use cw2::{get_contract_version, set_contract_version};
use cw_utils::nonpayable;
use semver::Version;

use crate::error::ContractError;
use crate::helpers::{
    must_attach_exact, must_attach_positive, push_send, reject_unexpected_funds, scaled_amount,
};
use crate::msg::{ExecuteMsg, InstantiateMsg, ListingResponse, MigrateMsg, QueryMsg};
use crate::state::{
    AssetInfo, Bid, Config, Listing, ALLOWED_ASSETS, CONFIG, LISTINGS, LISTING_COUNT,
};

pub const CONTRACT_NAME: &str = "escrow-marketplace";
pub const CONTRACT_VERSION: &str = "0.1.0";

pub const MAX_ASSET_DECIMALS: u32 = 18;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.denom.is_empty() {
        return Err(ContractError::InvalidDenom { denom: msg.denom });
    }

    let config = Config {
        denom: msg.denom,
        listing_deposit: msg.listing_deposit,
        custody_reserve: msg.custody_reserve,
    };

    CONFIG.save(deps.storage, &config)?;
    LISTING_COUNT.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("denom", config.denom)
        .add_attribute("listing_deposit", config.listing_deposit.to_string())
        .add_attribute("custody_reserve", config.custody_reserve.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::AllowAsset { denom, decimals } => {
            execute_allow_asset(deps, info, denom, decimals)
        }
        ExecuteMsg::FirstDeposit {
            asset,
            nonce,
            unitary_price,
        } => execute_first_deposit(deps, info, asset, nonce, unitary_price),
        ExecuteMsg::Deposit { asset, nonce } => execute_deposit(deps, info, asset, nonce),
        ExecuteMsg::SetPrice {
            asset,
            nonce,
            unitary_price,
        } => execute_set_price(deps, info, asset, nonce, unitary_price),
        ExecuteMsg::Buy {
            owner,
            asset,
            nonce,
            quantity,
        } => execute_buy(deps, info, owner, asset, nonce, quantity),
        ExecuteMsg::Bid {
            owner,
            asset,
            nonce,
            quantity,
            unitary_price,
        } => execute_bid(deps, info, owner, asset, nonce, quantity, unitary_price),
        ExecuteMsg::AcceptBid { asset, nonce } => execute_accept_bid(deps, info, asset, nonce),
        ExecuteMsg::Withdraw { asset, nonce } => execute_withdraw(deps, info, asset, nonce),
    }
}

fn load_listing(
    storage: &dyn Storage,
    key: (&Addr, &str, u64),
) -> Result<Listing, ContractError> {
    LISTINGS
        .may_load(storage, key)?
        .ok_or(ContractError::NoSuchListing {})
}

pub fn execute_allow_asset(
    deps: DepsMut,
    info: MessageInfo,
    denom: String,
    decimals: u32,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if denom.is_empty() || denom == config.denom {
        return Err(ContractError::InvalidDenom { denom });
    }
    if decimals > MAX_ASSET_DECIMALS {
        return Err(ContractError::InvalidDecimals { decimals });
    }
    if ALLOWED_ASSETS.has(deps.storage, &denom) {
        return Err(ContractError::AssetAlreadyAllowed { denom });
    }

    reject_unexpected_funds(&info, &[config.denom.as_str()])?;
    must_attach_exact(&info, &config.denom, config.custody_reserve)?;

    ALLOWED_ASSETS.save(deps.storage, &denom, &AssetInfo { decimals })?;

    Ok(Response::new()
        .add_attribute("action", "allow_asset")
        .add_attribute("asset", denom)
        .add_attribute("decimals", decimals.to_string()))
}

pub fn execute_first_deposit(
    deps: DepsMut,
    info: MessageInfo,
    asset: String,
    nonce: u64,
    unitary_price: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if !ALLOWED_ASSETS.has(deps.storage, &asset) {
        return Err(ContractError::AssetNotAllowed { denom: asset });
    }

    let key = (&info.sender, asset.as_str(), nonce);
    if LISTINGS.has(deps.storage, key) {
        return Err(ContractError::ListingAlreadyExists {});
    }

    reject_unexpected_funds(&info, &[config.denom.as_str(), asset.as_str()])?;
    must_attach_exact(&info, &config.denom, config.listing_deposit)?;
    let deposited = must_attach_positive(&info, &asset)?;

    let listing = Listing {
        deposited,
        unitary_price,
        bid: None,
    };
    LISTINGS.save(deps.storage, key, &listing)?;
    LISTING_COUNT.update(deps.storage, |count: u64| -> StdResult<u64> {
        Ok(count.saturating_add(1))
    })?;

    Ok(Response::new()
        .add_attribute("action", "first_deposit")
        .add_attribute("owner", info.sender.to_string())
        .add_attribute("asset", asset)
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("deposited", deposited.to_string()))
}

pub fn execute_deposit(
    deps: DepsMut,
    info: MessageInfo,
    asset: String,
    nonce: u64,
) -> Result<Response, ContractError> {
    let key = (&info.sender, asset.as_str(), nonce);
    let mut listing = load_listing(deps.storage, key)?;

    reject_unexpected_funds(&info, &[asset.as_str()])?;
    let amount = must_attach_positive(&info, &asset)?;

    listing.deposited = listing.deposited.checked_add(amount)?;
    LISTINGS.save(deps.storage, key, &listing)?;

    Ok(Response::new()
        .add_attribute("action", "deposit")
        .add_attribute("owner", info.sender.to_string())
        .add_attribute("asset", asset)
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("deposited", listing.deposited.to_string()))
}

pub fn execute_set_price(
    deps: DepsMut,
    info: MessageInfo,
    asset: String,
    nonce: u64,
    unitary_price: Uint128,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;

    let key = (&info.sender, asset.as_str(), nonce);
    let mut listing = load_listing(deps.storage, key)?;

    listing.unitary_price = unitary_price;
    LISTINGS.save(deps.storage, key, &listing)?;

    Ok(Response::new()
        .add_attribute("action", "set_price")
        .add_attribute("asset", asset)
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("unitary_price", unitary_price.to_string()))
}

pub fn execute_buy(
    deps: DepsMut,
    info: MessageInfo,
    owner: String,
    asset: String,
    nonce: u64,
    quantity: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let owner = deps.api.addr_validate(&owner)?;

    let key = (&owner, asset.as_str(), nonce);
    let mut listing = load_listing(deps.storage, key)?;
    let asset_info = ALLOWED_ASSETS.load(deps.storage, &asset)?;

    let amount_to_be_paid = scaled_amount(listing.unitary_price, quantity, asset_info.decimals)?;

    reject_unexpected_funds(&info, &[config.denom.as_str()])?;
    must_attach_exact(&info, &config.denom, amount_to_be_paid)?;

    listing.deposited = listing
        .deposited
        .checked_sub(quantity)
        .map_err(|_| ContractError::InsufficientDeposit {
            available: listing.deposited,
        })?;
    LISTINGS.save(deps.storage, key, &listing)?;

    let mut msgs: Vec<CosmosMsg> = vec![];
    push_send(&mut msgs, &owner, &config.denom, amount_to_be_paid);
    push_send(&mut msgs, &info.sender, &asset, quantity);

    Ok(Response::new()
        .add_attribute("action", "buy")
        .add_attribute("owner", owner.to_string())
        .add_attribute("buyer", info.sender.to_string())
        .add_attribute("asset", asset)
        .add_attribute("quantity", quantity.to_string())
        .add_attribute("paid", amount_to_be_paid.to_string())
        .add_messages(msgs))
}

pub fn execute_bid(
    deps: DepsMut,
    info: MessageInfo,
    owner: String,
    asset: String,
    nonce: u64,
    quantity: Uint128,
    unitary_price: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let owner = deps.api.addr_validate(&owner)?;

    let key = (&owner, asset.as_str(), nonce);
    let mut listing = load_listing(deps.storage, key)?;
    let asset_info = ALLOWED_ASSETS.load(deps.storage, &asset)?;

    if quantity > listing.deposited {
        return Err(ContractError::InsufficientDeposit {
            available: listing.deposited,
        });
    }

    let mut msgs: Vec<CosmosMsg> = vec![];
    if let Some(prior) = &listing.bid {
        if unitary_price <= prior.unitary_price {
            return Err(ContractError::BidTooLow {
                current: prior.unitary_price,
            });
        }

        // The standing escrow is refunded in full in the same call that
        // admits the replacement, so two bids are never reserved at once.
        let refund = scaled_amount(prior.unitary_price, prior.quantity, asset_info.decimals)?;
        push_send(&mut msgs, &prior.bidder, &config.denom, refund);
    }

    let escrow = scaled_amount(unitary_price, quantity, asset_info.decimals)?;
    reject_unexpected_funds(&info, &[config.denom.as_str()])?;
    must_attach_exact(&info, &config.denom, escrow)?;

    listing.bid = Some(Bid {
        bidder: info.sender.clone(),
        quantity,
        unitary_price,
    });
    LISTINGS.save(deps.storage, key, &listing)?;

    Ok(Response::new()
        .add_attribute("action", "bid")
        .add_attribute("owner", owner.to_string())
        .add_attribute("bidder", info.sender.to_string())
        .add_attribute("asset", asset)
        .add_attribute("quantity", quantity.to_string())
        .add_attribute("unitary_price", unitary_price.to_string())
        .add_attribute("escrow", escrow.to_string())
        .add_messages(msgs))
}

pub fn execute_accept_bid(
    deps: DepsMut,
    info: MessageInfo,
    asset: String,
    nonce: u64,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;

    let config = CONFIG.load(deps.storage)?;
    let key = (&info.sender, asset.as_str(), nonce);
    let mut listing = load_listing(deps.storage, key)?;
    let asset_info = ALLOWED_ASSETS.load(deps.storage, &asset)?;

    let mut bid = listing.bid.clone().ok_or(ContractError::NoActiveBid {})?;

    // A buy may have pushed the deposit below the reserved quantity, in
    // which case only what is left can be filled.
    let fill = listing.deposited.min(bid.quantity);
    let escrowed = scaled_amount(bid.unitary_price, bid.quantity, asset_info.decimals)?;

    let mut msgs: Vec<CosmosMsg> = vec![];
    push_send(&mut msgs, &bid.bidder, &asset, fill);
    push_send(&mut msgs, &info.sender, &config.denom, escrowed);

    listing.deposited = listing.deposited.checked_sub(fill)?;
    bid.quantity = bid.quantity.checked_sub(fill)?;
    // The bidder and price stay on the listing after a partial fill; the
    // remaining reservation applies to whatever the owner deposits next.
    listing.bid = Some(bid.clone());
    LISTINGS.save(deps.storage, key, &listing)?;

    Ok(Response::new()
        .add_attribute("action", "accept_bid")
        .add_attribute("owner", info.sender.to_string())
        .add_attribute("bidder", bid.bidder.to_string())
        .add_attribute("asset", asset)
        .add_attribute("filled", fill.to_string())
        .add_attribute("paid", escrowed.to_string())
        .add_messages(msgs))
}

pub fn execute_withdraw(
    deps: DepsMut,
    info: MessageInfo,
    asset: String,
    nonce: u64,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;

    let config = CONFIG.load(deps.storage)?;
    let key = (&info.sender, asset.as_str(), nonce);
    let listing = load_listing(deps.storage, key)?;
    let asset_info = ALLOWED_ASSETS.load(deps.storage, &asset)?;

    let mut msgs: Vec<CosmosMsg> = vec![];
    if let Some(bid) = &listing.bid {
        let refund = scaled_amount(bid.unitary_price, bid.quantity, asset_info.decimals)?;
        push_send(&mut msgs, &bid.bidder, &config.denom, refund);
    }

    LISTINGS.remove(deps.storage, key);
    LISTING_COUNT.update(deps.storage, |count: u64| -> StdResult<u64> {
        Ok(count.saturating_sub(1))
    })?;

    push_send(&mut msgs, &info.sender, &config.denom, config.listing_deposit);
    push_send(&mut msgs, &info.sender, &asset, listing.deposited);

    Ok(Response::new()
        .add_attribute("action", "withdraw")
        .add_attribute("owner", info.sender.to_string())
        .add_attribute("asset", asset)
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("returned", listing.deposited.to_string())
        .add_messages(msgs))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::CannotMigrate {
            previous: stored.contract,
        });
    }

    let stored_version: Version = stored.version.parse()?;
    let new_version: Version = CONTRACT_VERSION.parse()?;
    if stored_version >= new_version {
        return Err(ContractError::CannotMigrate {
            previous: stored.version,
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new().add_attribute("action", "migrate"))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::GetConfig {} => to_json_binary(&CONFIG.load(deps.storage)?),
        QueryMsg::GetAllowedAsset { denom } => {
            to_json_binary(&ALLOWED_ASSETS.load(deps.storage, &denom)?)
        }
        QueryMsg::GetListing {
            owner,
            asset,
            nonce,
        } => to_json_binary(&get_listing(deps, owner, asset, nonce)?),
        QueryMsg::GetListingsByOwner {
            owner,
            from_index,
            limit,
        } => to_json_binary(&get_listings_by_owner(deps, owner, from_index, limit)?),
        QueryMsg::GetAllListings { from_index, limit } => {
            to_json_binary(&get_all_listings(deps, from_index, limit)?)
        }
        QueryMsg::GetListingCount {} => to_json_binary(&LISTING_COUNT.load(deps.storage)?),
    }
}

pub fn get_listing(
    deps: Deps,
    owner: String,
    asset: String,
    nonce: u64,
) -> StdResult<ListingResponse> {
    let owner = deps.api.addr_validate(&owner)?;
    let listing = LISTINGS.load(deps.storage, (&owner, asset.as_str(), nonce))?;

    Ok(ListingResponse {
        owner,
        asset,
        nonce,
        deposited: listing.deposited,
        unitary_price: listing.unitary_price,
        bid: listing.bid,
    })
}

pub fn get_listings_by_owner(
    deps: Deps,
    owner: String,
    from_index: Option<u64>,
    limit: Option<u64>,
) -> StdResult<Vec<ListingResponse>> {
    let owner = deps.api.addr_validate(&owner)?;
    let from_index = from_index.unwrap_or(0);
    let limit = limit.unwrap_or(10);

    LISTINGS
        .sub_prefix(&owner)
        .range(deps.storage, None, None, Order::Ascending)
        .skip(from_index as usize)
        .take(limit as usize)
        .map(|item| {
            item.map(|((asset, nonce), listing)| ListingResponse {
                owner: owner.clone(),
                asset,
                nonce,
                deposited: listing.deposited,
                unitary_price: listing.unitary_price,
                bid: listing.bid,
            })
        })
        .collect()
}

pub fn get_all_listings(
    deps: Deps,
    from_index: Option<u64>,
    limit: Option<u64>,
) -> StdResult<Vec<ListingResponse>> {
    let from_index = from_index.unwrap_or(0);
    let limit = limit.unwrap_or(10);

    LISTINGS
        .range(deps.storage, None, None, Order::Ascending)
        .skip(from_index as usize)
        .take(limit as usize)
        .map(|item| {
            item.map(|((owner, asset, nonce), listing)| ListingResponse {
                owner,
                asset,
                nonce,
                deposited: listing.deposited,
                unitary_price: listing.unitary_price,
                bid: listing.bid,
            })
        })
        .collect()
}
