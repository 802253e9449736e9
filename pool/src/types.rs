//! Shared type aliases and storage-prefix keys.

use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::BorshStorageKey;

/// Token amount in base units. Signed so intermediate arithmetic never needs to special-case
/// underflow separately from overflow.
pub type Balance = i128;

/// Weight assigned to a depositor: `Balance * PeriodDays`.
pub type Tickets = i128;

/// Lock length of a pool instance, in days. Only used as a ticket multiplier.
pub type Period = u32;

#[derive(BorshSerialize, BorshDeserialize, BorshStorageKey)]
pub enum StorageKey {
    Balances,
    Tickets,
    DepositorList,
}
