//! Pool failure modes. Every entry point either returns its documented value or aborts with
//! exactly one of these, surfaced through `env::panic_str`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("contract is already initialized")]
    AlreadyInitialized,
    #[error("contract is not initialized")]
    NotInitialized,
    #[error("period_days must be nonzero and at most 365, got {0}")]
    BadPeriod(u32),
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("insufficient balance: have {have}, requested {requested}")]
    InsufficientBalance { have: i128, requested: i128 },
    #[error("no participants with a positive balance")]
    NoParticipants,
    #[error("total tickets are zero")]
    NoTickets,
    #[error("prize fund is empty")]
    NoPrize,
    #[error("lender pool can only be changed while nothing is supplied to it")]
    LenderPoolLocked,
    #[error("lender pool has not been configured")]
    LenderNotSet,
    #[error("token transfer failed")]
    TokenTransferFailed,
    #[error("lender rejected the operation")]
    LenderRejected,
    #[error("slippage exceeded: wanted at least {min_return}, got {actual}")]
    SlippageExceeded { min_return: u128, actual: u128 },
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error("unauthorized: caller is not the admin")]
    Unauthorized,
}
