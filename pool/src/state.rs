//! Persisted contract state, initialization, and read-only view methods.

use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::json_types::U128;
use near_sdk::serde::Serialize;
use near_sdk::{env, ext_contract, near_bindgen, AccountId, PanicOnDefault};

use crate::admin::assert_admin;
use crate::error::PoolError;
use crate::ledger::Ledger;
use crate::types::{Balance, Period};

#[derive(BorshSerialize, BorshDeserialize, Serialize, Clone, Debug)]
#[serde(crate = "near_sdk::serde")]
pub struct LastDraw {
    pub timestamp: u64,
    pub winner: AccountId,
    pub prize: U128,
    pub nonce: u64,
}

#[near_bindgen]
#[derive(BorshSerialize, BorshDeserialize, PanicOnDefault)]
pub struct Contract {
    pub(crate) admin: AccountId,
    pub(crate) token: AccountId,
    pub(crate) period_days: Period,
    pub(crate) ledger: Ledger,
    pub(crate) prize_fund: Balance,
    pub(crate) lender_pool: Option<AccountId>,
    pub(crate) supplied_to_lender: Balance,
    pub(crate) draw_nonce: u64,
    pub(crate) last_draw: Option<LastDraw>,
}

/// Unwraps a `Result<T, PoolError>` by panicking with the error's `Display` text — the WASM ABI
/// has no typed error channel, so this is the boundary translation point.
pub(crate) trait NearUnwrap<T> {
    fn near_unwrap(self) -> T;
}

/// Self-referential callbacks resolved once a dependent cross-contract promise settles. Each
/// mutating entry point that fans out to the token contract or the lender defines its durable
/// state transition here rather than optimistically before the call.
#[ext_contract(ext_self)]
pub trait SelfCallbacks {
    fn resolve_withdraw(&mut self, account_id: AccountId, amount: U128, period_days: u32);
    fn resolve_supply(&mut self, amount: U128);
    fn resolve_lender_withdraw(&mut self, amount: U128, min_return: U128) -> U128;
    fn resolve_harvest(&mut self, amount: U128, min_return: U128) -> U128;
    fn resolve_draw(&mut self, winner: AccountId, prize: U128, nonce: u64) -> AccountId;
}

impl<T> NearUnwrap<T> for Result<T, PoolError> {
    #[track_caller]
    fn near_unwrap(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => env::panic_str(&err.to_string()),
        }
    }
}

#[near_bindgen]
impl Contract {
    #[init]
    pub fn new(admin: AccountId, token: AccountId, period_days: Period) -> Self {
        let valid: Result<(), PoolError> = if period_days == 0 || period_days > 365 {
            Err(PoolError::BadPeriod(period_days))
        } else {
            Ok(())
        };
        valid.near_unwrap();
        Self {
            admin,
            token,
            period_days,
            ledger: Ledger::new(),
            prize_fund: 0,
            lender_pool: None,
            supplied_to_lender: 0,
            draw_nonce: 0,
            last_draw: None,
        }
    }

    pub fn get_balance(&self, account_id: AccountId) -> U128 {
        U128(self.ledger.balance_of(&account_id) as u128)
    }

    pub fn get_tickets(&self, account_id: AccountId) -> U128 {
        U128(self.ledger.tickets_of(&account_id) as u128)
    }

    pub fn get_total_deposits(&self) -> U128 {
        U128(self.ledger.total_deposits() as u128)
    }

    pub fn get_total_tickets(&self) -> U128 {
        U128(self.ledger.total_tickets() as u128)
    }

    pub fn get_prize_fund(&self) -> U128 {
        U128(self.prize_fund as u128)
    }

    pub fn get_supplied_to_lender(&self) -> U128 {
        U128(self.supplied_to_lender as u128)
    }

    pub fn get_period_days(&self) -> Period {
        self.period_days
    }

    pub fn get_lender_pool(&self) -> Option<AccountId> {
        self.lender_pool.clone()
    }

    pub fn get_last_draw(&self) -> Option<LastDraw> {
        self.last_draw.clone()
    }

    pub fn get_token(&self) -> AccountId {
        self.token.clone()
    }

    pub fn get_admin(&self) -> AccountId {
        self.admin.clone()
    }

    pub(crate) fn require_admin(&self) {
        assert_admin(&self.admin).near_unwrap()
    }
}
