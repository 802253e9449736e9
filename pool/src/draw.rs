//! Verifiable-random winner selection over the depositor list's cumulative ticket ranges.

use near_sdk::AccountId;

use crate::error::PoolError;
use crate::ledger::Ledger;
use crate::types::Tickets;

/// Injected source of entropy, so tests can substitute a deterministic generator for the
/// production `env::random_seed()` source (see `RuntimeEntropy`).
pub trait EntropySource {
    fn next_u64(&mut self) -> u64;
}

/// Production entropy: mixes the per-block VRF-derived `random_seed` with block metadata and the
/// draw nonce, so successive draws in the same block (impossible today, but not structurally
/// ruled out) would still sample independently.
pub struct RuntimeEntropy {
    pub draw_nonce: u64,
}

impl EntropySource for RuntimeEntropy {
    fn next_u64(&mut self) -> u64 {
        let seed = near_sdk::env::random_seed();
        let mut acc = near_sdk::env::block_timestamp() ^ near_sdk::env::block_height() ^ self.draw_nonce;
        for chunk in seed.chunks(8) {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            acc ^= u64::from_le_bytes(buf);
        }
        acc
    }
}

/// Selects a winner proportionally to ticket weight. `total_tickets` must equal the sum of every
/// entry yielded by `depositors` and must be strictly positive.
pub fn select_winner(
    depositors: impl Iterator<Item = (AccountId, Tickets)>,
    total_tickets: Tickets,
    entropy: &mut impl EntropySource,
) -> Result<AccountId, PoolError> {
    if total_tickets <= 0 {
        return Err(PoolError::NoTickets);
    }

    let winning_index = (entropy.next_u64() as u128) % (total_tickets as u128);

    let mut cumulative: u128 = 0;
    for (account_id, tickets) in depositors {
        cumulative += tickets as u128;
        if winning_index < cumulative {
            return Ok(account_id);
        }
    }

    // Every ticket is accounted for by construction; reaching here means `total_tickets` didn't
    // match the sum actually walked, which is a ledger invariant violation, not a user error.
    unreachable!("depositor ticket sum did not cover total_tickets")
}

/// Picks a winner from the ledger's current depositor list.
pub fn select_winner_from_ledger(
    ledger: &Ledger,
    entropy: &mut impl EntropySource,
) -> Result<AccountId, PoolError> {
    select_winner(ledger.iter_depositors(), ledger.total_tickets(), entropy)
}
