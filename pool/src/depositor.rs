//! Depositor-facing entry points: accepting deposits through the NEP-141 receiver callback, and
//! returning principal on request.

use near_contract_standards::fungible_token::receiver::FungibleTokenReceiver;
use near_sdk::json_types::U128;
use near_sdk::{assert_one_yocto, env, near_bindgen, AccountId, Promise, PromiseOrValue};

use crate::error::PoolError;
use crate::events;
use crate::state::{ext_self, Contract, NearUnwrap};
use crate::token_gateway::{self, GAS_FOR_RESOLVE_TRANSFER};

#[near_bindgen]
impl FungibleTokenReceiver for Contract {
    /// Credits the sender's balance with the transferred amount. Called by the token contract,
    /// never by the depositor directly — this is the deposit entry point in NEP-141 terms.
    /// Panics (triggering the token contract's automatic refund) if `amount` is zero.
    fn ft_on_transfer(
        &mut self,
        sender_id: AccountId,
        amount: U128,
        _msg: String,
    ) -> PromiseOrValue<U128> {
        let result: Result<(), PoolError> = (|| {
            if env::predecessor_account_id() != self.token {
                return Err(PoolError::TokenTransferFailed);
            }
            if amount.0 == 0 {
                return Err(PoolError::ZeroAmount);
            }
            Ok(())
        })();
        result.near_unwrap();

        let period_days = self.period_days;
        self.ledger
            .credit(&sender_id, amount.0 as i128, period_days)
            .near_unwrap();

        let tickets = self.ledger.tickets_of(&sender_id) as u128;
        events::log_deposited(&sender_id, amount.0, tickets);

        PromiseOrValue::Value(U128(0))
    }
}

#[near_bindgen]
impl Contract {
    /// Returns `amount` base units of principal to the caller. Debits the ledger first so a
    /// failed transfer has something to roll back; only commits durably once the outbound
    /// transfer is observed to succeed.
    #[payable]
    pub fn withdraw(&mut self, amount: U128) -> Promise {
        assert_one_yocto();
        let account_id = env::predecessor_account_id();

        let result: Result<(), PoolError> = if amount.0 == 0 {
            Err(PoolError::ZeroAmount)
        } else {
            Ok(())
        };
        result.near_unwrap();

        let period_days = self.period_days;
        self.ledger
            .debit(&account_id, amount.0 as i128, period_days)
            .near_unwrap();

        let resolver = ext_self::ext(env::current_account_id())
            .with_static_gas(GAS_FOR_RESOLVE_TRANSFER)
            .resolve_withdraw(account_id.clone(), amount, period_days);

        token_gateway::send_tokens(&self.token, &account_id, amount.0, resolver)
    }

    #[private]
    pub fn resolve_withdraw(&mut self, account_id: AccountId, amount: U128, period_days: u32) {
        if token_gateway::last_promise_succeeded() {
            events::log_withdrew(&account_id, amount.0);
        } else {
            // Transfer failed: undo the provisional debit by crediting back.
            self.ledger
                .credit(&account_id, amount.0 as i128, period_days)
                .near_unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_sdk::test_utils::{accounts, VMContextBuilder};
    use near_sdk::testing_env;

    fn contract() -> Contract {
        testing_env!(VMContextBuilder::new().predecessor_account_id(accounts(0)).build());
        Contract::new(accounts(0), accounts(9), 7)
    }

    #[test]
    fn ft_on_transfer_credits_sender_and_accepts_whole_amount() {
        let mut contract = contract();
        testing_env!(VMContextBuilder::new()
            .predecessor_account_id(accounts(9))
            .build());

        let accepted = contract.ft_on_transfer(accounts(1), U128(100), String::new());

        assert_eq!(contract.get_balance(accounts(1)), U128(100));
        assert_eq!(contract.get_tickets(accounts(1)), U128(700));
        match accepted {
            PromiseOrValue::Value(unused) => assert_eq!(unused, U128(0)),
            PromiseOrValue::Promise(_) => panic!("ft_on_transfer should not schedule a promise"),
        }
    }

    #[test]
    #[should_panic(expected = "token transfer failed")]
    fn ft_on_transfer_rejects_calls_not_from_the_token() {
        let mut contract = contract();
        testing_env!(VMContextBuilder::new()
            .predecessor_account_id(accounts(1))
            .build());
        contract.ft_on_transfer(accounts(1), U128(100), String::new());
    }

    #[test]
    #[should_panic(expected = "amount must be greater than zero")]
    fn ft_on_transfer_rejects_zero_amount() {
        let mut contract = contract();
        testing_env!(VMContextBuilder::new()
            .predecessor_account_id(accounts(9))
            .build());
        contract.ft_on_transfer(accounts(1), U128(0), String::new());
    }

    #[test]
    fn withdraw_debits_the_ledger_before_the_transfer_promise_resolves() {
        let mut contract = contract();
        testing_env!(VMContextBuilder::new()
            .predecessor_account_id(accounts(9))
            .build());
        contract.ft_on_transfer(accounts(1), U128(100), String::new());

        testing_env!(VMContextBuilder::new()
            .predecessor_account_id(accounts(1))
            .attached_deposit(1)
            .build());
        let _ = contract.withdraw(U128(40));

        assert_eq!(contract.get_balance(accounts(1)), U128(60));
        assert_eq!(contract.get_tickets(accounts(1)), U128(420));
    }

    #[test]
    #[should_panic(expected = "insufficient balance")]
    fn withdraw_rejects_amount_above_balance() {
        let mut contract = contract();
        testing_env!(VMContextBuilder::new()
            .predecessor_account_id(accounts(9))
            .build());
        contract.ft_on_transfer(accounts(1), U128(100), String::new());

        testing_env!(VMContextBuilder::new()
            .predecessor_account_id(accounts(1))
            .attached_deposit(1)
            .build());
        contract.withdraw(U128(101));
    }
}
