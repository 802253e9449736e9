//! Ticket arithmetic: `tickets = amount * period_days`, exact integer, checked against overflow.
//!
//! Overflow here would desynchronize `Tickets` from `Balance`, the one invariant the draw
//! mechanism depends on, so it must hard-fail rather than wrap or saturate.

use crate::error::PoolError;
use crate::types::{Balance, Period, Tickets};

pub fn tickets_for(amount: Balance, period_days: Period) -> Result<Tickets, PoolError> {
    amount
        .checked_mul(Tickets::from(period_days))
        .ok_or(PoolError::ArithmeticOverflow)
}
