//! Admin-gated entry points: lender configuration and relending, and draw execution. Every method
//! here requires both a one-yoctoNEAR attachment (forces an explicit signed transaction, not a
//! delegated function-call-key action) and `predecessor_account_id() == admin`.

use near_sdk::json_types::U128;
use near_sdk::{assert_one_yocto, env, near_bindgen, AccountId, Promise, PromiseResult};

use crate::draw::{select_winner_from_ledger, RuntimeEntropy};
use crate::error::PoolError;
use crate::events;
use crate::lender::{self, GAS_FOR_RESOLVE_LENDER_CALL};
use crate::state::{ext_self, Contract, LastDraw, NearUnwrap};
use crate::token_gateway::{self, GAS_FOR_RESOLVE_TRANSFER};

pub fn assert_admin(admin: &AccountId) -> Result<(), PoolError> {
    if &env::predecessor_account_id() != admin {
        return Err(PoolError::Unauthorized);
    }
    Ok(())
}

#[near_bindgen]
impl Contract {
    /// Points the pool at an external lending pool. Only settable while nothing is supplied,
    /// matching the data model's rule that re-pointing a live lender would strand accounted
    /// principal with no way to reconcile it against the new lender's balance.
    #[payable]
    pub fn set_lender_pool(&mut self, pool: AccountId) {
        assert_one_yocto();
        self.require_admin();

        let result: Result<(), PoolError> = if self.supplied_to_lender != 0 {
            Err(PoolError::LenderPoolLocked)
        } else {
            Ok(())
        };
        result.near_unwrap();

        self.lender_pool = Some(pool);
    }

    /// Relends `amount` of the pool's own (undeployed) token balance to the configured lender.
    /// `SuppliedToLender` is only advanced once the transfer is observed to have been accepted in
    /// full by the lender's receiver, in `resolve_supply`; any partial acceptance is a rejection.
    #[payable]
    pub fn supply_to_lender(&mut self, amount: U128) -> Promise {
        assert_one_yocto();
        self.require_admin();

        let pool: Result<AccountId, PoolError> =
            self.lender_pool.clone().ok_or(PoolError::LenderNotSet);
        let pool = pool.near_unwrap();

        let resolver = ext_self::ext(env::current_account_id())
            .with_static_gas(GAS_FOR_RESOLVE_LENDER_CALL)
            .resolve_supply(amount);

        lender::request_supply(&self.token, &pool, amount.0, resolver)
    }

    #[private]
    pub fn resolve_supply(&mut self, amount: U128) {
        // `ft_transfer_call` resolves with the *unused* (refunded) amount. Anything short of full
        // acceptance is a rejection, not a partial success: the spec draws no distinction between
        // the lender's receiver declining outright and it only taking part of the transfer.
        let result: Result<U128, PoolError> = match env::promise_result(0) {
            PromiseResult::Successful(bytes) => {
                near_sdk::serde_json::from_slice::<U128>(&bytes).map_err(|_| PoolError::LenderRejected)
            }
            PromiseResult::Failed | PromiseResult::NotReady => Err(PoolError::LenderRejected),
        };
        let unused = result.near_unwrap();

        let accepted = lender::accepted_from_unused(amount.0, unused.0);
        let guarded: Result<(), PoolError> = if accepted < amount.0 {
            Err(PoolError::LenderRejected)
        } else {
            Ok(())
        };
        guarded.near_unwrap();

        self.supplied_to_lender = self
            .supplied_to_lender
            .checked_add(accepted as i128)
            .ok_or(PoolError::ArithmeticOverflow)
            .near_unwrap();

        events::log_supplied(accepted);
    }

    /// Pulls `amount` of principal back from the lender. Aborts with `SlippageExceeded` in the
    /// resolver if the realized delta undershoots `min_return`; `SuppliedToLender` is reduced by
    /// the requested `amount` (capped at the current balance), not the realized delta, matching
    /// the accounting-lower-bound semantics of `SuppliedToLender`.
    #[payable]
    pub fn withdraw_from_lender(&mut self, amount: U128, min_return: U128) -> Promise {
        assert_one_yocto();
        self.require_admin();

        let pool: Result<AccountId, PoolError> =
            self.lender_pool.clone().ok_or(PoolError::LenderNotSet);
        let pool = pool.near_unwrap();

        let resolver = ext_self::ext(env::current_account_id())
            .with_static_gas(GAS_FOR_RESOLVE_LENDER_CALL)
            .resolve_lender_withdraw(amount, min_return);

        lender::request_withdraw(&pool, amount.0, resolver)
    }

    #[private]
    pub fn resolve_lender_withdraw(&mut self, amount: U128, min_return: U128) -> U128 {
        let actual = lender::read_realized_amount().near_unwrap();

        let guarded: Result<(), PoolError> = if actual < min_return.0 {
            Err(PoolError::SlippageExceeded {
                min_return: min_return.0,
                actual,
            })
        } else {
            Ok(())
        };
        guarded.near_unwrap();

        let reduction = amount.0.min(self.supplied_to_lender as u128) as i128;
        self.supplied_to_lender -= reduction;

        events::log_withdrawn(amount.0, actual);
        U128(actual)
    }

    /// Realizes `amount` of accrued yield from the lender into the prize fund. The admin computes
    /// `amount` off-chain from the lender's true balance minus `SuppliedToLender`; the core never
    /// queries the lender itself (see `get_supplied_to_lender`).
    #[payable]
    pub fn harvest_yield(&mut self, amount: U128, min_return: U128) -> Promise {
        assert_one_yocto();
        self.require_admin();

        let pool: Result<AccountId, PoolError> =
            self.lender_pool.clone().ok_or(PoolError::LenderNotSet);
        let pool = pool.near_unwrap();

        let resolver = ext_self::ext(env::current_account_id())
            .with_static_gas(GAS_FOR_RESOLVE_LENDER_CALL)
            .resolve_harvest(amount, min_return);

        lender::request_harvest(&pool, amount.0, resolver)
    }

    #[private]
    pub fn resolve_harvest(&mut self, amount: U128, min_return: U128) -> U128 {
        let actual = lender::read_realized_amount().near_unwrap();

        let guarded: Result<(), PoolError> = if actual < min_return.0 {
            Err(PoolError::SlippageExceeded {
                min_return: min_return.0,
                actual,
            })
        } else {
            Ok(())
        };
        guarded.near_unwrap();

        self.prize_fund = self
            .prize_fund
            .checked_add(actual as i128)
            .ok_or(PoolError::ArithmeticOverflow)
            .near_unwrap();

        events::log_harvested(amount.0, actual);
        U128(actual)
    }

    /// Selects a winner proportionally to ticket weight and transfers the entire prize fund to
    /// them. `PrizeFund` is only reset, and `DrawNonce` only advanced, in `resolve_draw` once the
    /// transfer is observed to succeed — a failed transfer leaves the draw retryable.
    #[payable]
    pub fn execute_draw(&mut self) -> Promise {
        assert_one_yocto();
        self.require_admin();

        let preconditions: Result<(), PoolError> = (|| {
            if self.ledger.total_deposits() <= 0 {
                return Err(PoolError::NoParticipants);
            }
            if self.ledger.total_tickets() <= 0 {
                return Err(PoolError::NoTickets);
            }
            if self.prize_fund <= 0 {
                return Err(PoolError::NoPrize);
            }
            Ok(())
        })();
        preconditions.near_unwrap();

        let mut entropy = RuntimeEntropy {
            draw_nonce: self.draw_nonce,
        };
        let winner = select_winner_from_ledger(&self.ledger, &mut entropy).near_unwrap();
        let prize = U128(self.prize_fund as u128);

        let resolver = ext_self::ext(env::current_account_id())
            .with_static_gas(GAS_FOR_RESOLVE_TRANSFER)
            .resolve_draw(winner.clone(), prize, self.draw_nonce);

        token_gateway::send_tokens(&self.token, &winner, prize.0, resolver)
    }

    #[private]
    pub fn resolve_draw(&mut self, winner: AccountId, prize: U128, nonce: u64) -> AccountId {
        let result: Result<(), PoolError> = if token_gateway::last_promise_succeeded() {
            Ok(())
        } else {
            Err(PoolError::TokenTransferFailed)
        };
        result.near_unwrap();

        debug_assert_eq!(
            self.draw_nonce, nonce,
            "draw nonce advanced between execute_draw and its resolver"
        );
        self.prize_fund = 0;
        self.draw_nonce += 1;
        self.last_draw = Some(LastDraw {
            timestamp: env::block_timestamp(),
            winner: winner.clone(),
            prize,
            nonce: self.draw_nonce,
        });

        events::log_draw_executed(&winner, prize.0, self.draw_nonce);
        winner
    }
}
