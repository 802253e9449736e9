//! The external lending pool collaborator. Supplies/withdraws/harvests are slippage-guarded;
//! `SuppliedToLender` is only mutated after the lender's promise is observed to succeed, so a
//! failed call leaves accounting untouched.

use near_contract_standards::fungible_token::core::ext_ft_core;
use near_sdk::json_types::U128;
use near_sdk::{ext_contract, AccountId, Gas, Promise, PromiseResult};

use crate::error::PoolError;

pub const GAS_FOR_LENDER_CALL: Gas = Gas(30_000_000_000_000);
pub const GAS_FOR_RESOLVE_LENDER_CALL: Gas = Gas(20_000_000_000_000);
pub const GAS_FOR_SUPPLY_TRANSFER: Gas = Gas(40_000_000_000_000);

#[ext_contract(ext_lender)]
pub trait Lender {
    /// Returns the token to the caller, reporting back the realized amount actually returned.
    fn withdraw(&mut self, amount: U128) -> U128;

    /// Realizes `amount` of accrued yield, reporting back the realized amount actually returned.
    fn harvest(&mut self, amount: U128) -> U128;
}

/// Supplies `amount` base units of `token_id` to `lender_id` via a single `ft_transfer_call`,
/// chained to `then_resolve`. There is no allowance step: NEP-141's `ft_transfer_call` moves the
/// tokens and invokes the lender's receiver in one atomic promise.
pub fn request_supply(
    token_id: &AccountId,
    lender_id: &AccountId,
    amount: u128,
    then_resolve: Promise,
) -> Promise {
    ext_ft_core::ext(token_id.clone())
        .with_attached_deposit(1)
        .with_static_gas(GAS_FOR_SUPPLY_TRANSFER)
        .ft_transfer_call(lender_id.clone(), U128(amount), None, String::new())
        .then(then_resolve)
}

pub fn request_withdraw(lender_id: &AccountId, amount: u128, then_resolve: Promise) -> Promise {
    ext_lender::ext(lender_id.clone())
        .with_static_gas(GAS_FOR_LENDER_CALL)
        .withdraw(U128(amount))
        .then(then_resolve)
}

pub fn request_harvest(lender_id: &AccountId, amount: u128, then_resolve: Promise) -> Promise {
    ext_lender::ext(lender_id.clone())
        .with_static_gas(GAS_FOR_LENDER_CALL)
        .harvest(U128(amount))
        .then(then_resolve)
}

/// Reads the single pending promise result and parses it as a `U128` realized-amount.
pub fn read_realized_amount() -> Result<u128, PoolError> {
    if near_sdk::env::promise_results_count() != 1 {
        return Err(PoolError::LenderRejected);
    }
    match near_sdk::env::promise_result(0) {
        PromiseResult::Successful(bytes) => {
            near_sdk::serde_json::from_slice::<U128>(&bytes)
                .map(|v| v.0)
                .map_err(|_| PoolError::LenderRejected)
        }
        PromiseResult::Failed | PromiseResult::NotReady => Err(PoolError::LenderRejected),
    }
}

/// `ft_transfer_call`'s resolved value is the NEP-141-standard *unused* (refunded) amount, not the
/// accepted amount. Converts it to the amount the lender actually accepted.
pub fn accepted_from_unused(amount_sent: u128, unused: u128) -> u128 {
    amount_sent.saturating_sub(unused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_sdk::test_utils::VMContextBuilder;
    use near_sdk::testing_env;

    #[test]
    fn accepted_from_unused_subtracts_the_refund() {
        assert_eq!(accepted_from_unused(100, 0), 100);
        assert_eq!(accepted_from_unused(100, 20), 80);
        assert_eq!(accepted_from_unused(100, 100), 0);
    }

    #[test]
    fn accepted_from_unused_never_underflows_on_a_bogus_overlarge_refund() {
        assert_eq!(accepted_from_unused(100, 150), 0);
    }

    fn resolve_as_callback(result: PromiseResult) {
        testing_env!(
            VMContextBuilder::new().build(),
            near_sdk::VMConfig::test(),
            near_sdk::RuntimeFeesConfig::test(),
            Default::default(),
            vec![result]
        );
    }

    #[test]
    fn read_realized_amount_parses_a_successful_result() {
        resolve_as_callback(PromiseResult::Successful(
            near_sdk::serde_json::to_vec(&U128(42)).unwrap(),
        ));
        assert_eq!(read_realized_amount().unwrap(), 42);
    }

    #[test]
    fn read_realized_amount_rejects_a_failed_promise() {
        resolve_as_callback(PromiseResult::Failed);
        assert!(matches!(
            read_realized_amount(),
            Err(PoolError::LenderRejected)
        ));
    }

    #[test]
    fn read_realized_amount_rejects_unparseable_bytes() {
        resolve_as_callback(PromiseResult::Successful(b"not json".to_vec()));
        assert!(matches!(
            read_realized_amount(),
            Err(PoolError::LenderRejected)
        ));
    }
}
