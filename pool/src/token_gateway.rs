//! Outbound transfers of the deposit token. NEP-141 has no allowance/`transfer_from` model, so
//! inbound deposits arrive through `FungibleTokenReceiver::ft_on_transfer` instead (see
//! `depositor.rs`); this module only wraps the outbound side.

use near_contract_standards::fungible_token::core::ext_ft_core;
use near_sdk::json_types::U128;
use near_sdk::{env, AccountId, Gas, Promise};

pub const GAS_FOR_FT_TRANSFER: Gas = Gas(20_000_000_000_000);
pub const GAS_FOR_RESOLVE_TRANSFER: Gas = Gas(20_000_000_000_000);

/// Starts a `ft_transfer` of `amount` base units of `token_id` to `receiver_id`, chained to
/// `then_resolve` (the caller's `#[private]` resolver) once the transfer promise settles.
pub fn send_tokens(
    token_id: &AccountId,
    receiver_id: &AccountId,
    amount: u128,
    then_resolve: Promise,
) -> Promise {
    ext_ft_core::ext(token_id.clone())
        .with_attached_deposit(1)
        .with_static_gas(GAS_FOR_FT_TRANSFER)
        .ft_transfer(receiver_id.clone(), U128(amount), None)
        .then(then_resolve)
}

/// True if the single pending cross-contract promise resolved successfully.
pub fn last_promise_succeeded() -> bool {
    match env::promise_result(0) {
        near_sdk::PromiseResult::Successful(_) => true,
        near_sdk::PromiseResult::Failed | near_sdk::PromiseResult::NotReady => false,
    }
}
