//! NEP-297 structured events, logged as `EVENT_JSON:{...}` lines.

use near_sdk::json_types::U128;
use near_sdk::{env, AccountId};
use serde::Serialize;

#[derive(Serialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
struct NearEventWrapper<'a> {
    standard: &'static str,
    version: &'static str,
    #[serde(flatten)]
    event: Event<'a>,
}

#[derive(Serialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
enum Event<'a> {
    Deposited {
        user: &'a AccountId,
        amount: U128,
        tickets: U128,
    },
    Withdrew {
        user: &'a AccountId,
        amount: U128,
    },
    Supplied {
        amount: U128,
    },
    Withdrawn {
        amount: U128,
        actual: U128,
    },
    Harvested {
        amount: U128,
        actual: U128,
    },
    DrawExecuted {
        winner: &'a AccountId,
        prize: U128,
        nonce: u64,
    },
}

fn emit(event: Event<'_>) {
    let event = NearEventWrapper {
        standard: "prize-pool",
        version: "1.0.0",
        event,
    };
    let Ok(json_string) = serde_json::to_string(&event) else {
        unreachable!()
    };
    env::log_str(&format!("EVENT_JSON:{json_string}"));
}

pub fn log_deposited(user: &AccountId, amount: u128, tickets: u128) {
    emit(Event::Deposited {
        user,
        amount: amount.into(),
        tickets: tickets.into(),
    });
}

pub fn log_withdrew(user: &AccountId, amount: u128) {
    emit(Event::Withdrew {
        user,
        amount: amount.into(),
    });
}

pub fn log_supplied(amount: u128) {
    emit(Event::Supplied {
        amount: amount.into(),
    });
}

pub fn log_withdrawn(amount: u128, actual: u128) {
    emit(Event::Withdrawn {
        amount: amount.into(),
        actual: actual.into(),
    });
}

pub fn log_harvested(amount: u128, actual: u128) {
    emit(Event::Harvested {
        amount: amount.into(),
        actual: actual.into(),
    });
}

pub fn log_draw_executed(winner: &AccountId, prize: u128, nonce: u64) {
    emit(Event::DrawExecuted {
        winner,
        prize: prize.into(),
        nonce,
    });
}
