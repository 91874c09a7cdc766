use cosmwasm_std::{coins, Addr, BankMsg, CosmosMsg, MessageInfo, Uint128, Uint256};
use cw_utils::PaymentError;

use crate::error::ContractError;

/// Total amount of `denom` attached to the message, zero when absent.
pub fn attached_amount(info: &MessageInfo, denom: &str) -> Uint128 {
    info.funds
        .iter()
        .filter(|coin| coin.denom == denom)
        .map(|coin| coin.amount)
        .sum()
}

/// The attached amount of `denom` must equal `expected` exactly.
pub fn must_attach_exact(
    info: &MessageInfo,
    denom: &str,
    expected: Uint128,
) -> Result<(), ContractError> {
    if attached_amount(info, denom) != expected {
        return Err(ContractError::IncorrectPayment { expected });
    }
    Ok(())
}

/// The attached amount of `denom` must be strictly positive.
pub fn must_attach_positive(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    let amount = attached_amount(info, denom);
    if amount.is_zero() {
        return Err(ContractError::Payment(PaymentError::NoFunds {}));
    }
    Ok(amount)
}

/// Rejects any attached coin whose denom is not in `expected`, so funds the
/// handler does not account for can never be stranded in the contract.
pub fn reject_unexpected_funds(
    info: &MessageInfo,
    expected: &[&str],
) -> Result<(), ContractError> {
    for coin in &info.funds {
        if !expected.contains(&coin.denom.as_str()) {
            return Err(ContractError::Payment(PaymentError::ExtraDenom(
                coin.denom.clone(),
            )));
        }
    }
    Ok(())
}

/// Value of `quantity` units at `unitary_price`, scaled down by the asset's
/// decimal precision, truncating toward zero. The multiply is widened to 256
/// bits before the divide so it cannot overflow or lose precision.
pub fn scaled_amount(
    unitary_price: Uint128,
    quantity: Uint128,
    decimals: u32,
) -> Result<Uint128, ContractError> {
    let scale = Uint256::from(10u128.pow(decimals));
    let amount = Uint256::from(unitary_price)
        .checked_mul(Uint256::from(quantity))?
        .checked_div(scale)?;
    Ok(amount.try_into()?)
}

/// Queues a bank send, skipped for zero amounts (the bank module rejects
/// zero-value coins).
pub fn push_send(msgs: &mut Vec<CosmosMsg>, to: &Addr, denom: &str, amount: Uint128) {
    if !amount.is_zero() {
        msgs.push(
            BankMsg::Send {
                to_address: to.to_string(),
                amount: coins(amount.u128(), denom),
            }
            .into(),
        );
    }
}
