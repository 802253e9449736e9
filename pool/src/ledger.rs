//! Per-depositor balance/ticket accounting and the aggregate totals that must always track it.

use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::collections::LookupMap;
use near_sdk::AccountId;
use near_iterable_maps::DoublyLinkedListMap;

use crate::error::PoolError;
use crate::ticket_math::tickets_for;
use crate::types::{Balance, Period, StorageKey, Tickets};

#[derive(BorshSerialize, BorshDeserialize)]
pub struct Ledger {
    balances: LookupMap<AccountId, Balance>,
    tickets: LookupMap<AccountId, Tickets>,
    depositors: DoublyLinkedListMap<AccountId, ()>,
    total_deposits: Balance,
    total_tickets: Tickets,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            balances: LookupMap::new(StorageKey::Balances),
            tickets: LookupMap::new(StorageKey::Tickets),
            depositors: DoublyLinkedListMap::new(StorageKey::DepositorList),
            total_deposits: 0,
            total_tickets: 0,
        }
    }

    pub fn balance_of(&self, account_id: &AccountId) -> Balance {
        self.balances.get(account_id).unwrap_or(0)
    }

    pub fn tickets_of(&self, account_id: &AccountId) -> Tickets {
        self.tickets.get(account_id).unwrap_or(0)
    }

    pub fn total_deposits(&self) -> Balance {
        self.total_deposits
    }

    pub fn total_tickets(&self) -> Tickets {
        self.total_tickets
    }

    pub fn depositor_count(&self) -> usize {
        self.depositors.len()
    }

    /// Walks depositors in stored order, yielding `(account_id, tickets)`.
    pub fn iter_depositors(&self) -> impl Iterator<Item = (AccountId, Tickets)> + '_ {
        self.depositors
            .iter()
            .map(move |(account_id, ())| (account_id.clone(), self.tickets_of(&account_id)))
    }

    /// Credits `amount` to `account_id`, issuing `amount * period_days` tickets.
    /// Adds the account to the depositor list if this is its first positive balance.
    pub fn credit(
        &mut self,
        account_id: &AccountId,
        amount: Balance,
        period_days: Period,
    ) -> Result<(), PoolError> {
        let old_balance = self.balance_of(account_id);
        let old_tickets = self.tickets_of(account_id);
        let was_empty = old_balance == 0;

        let new_balance = old_balance
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let new_tickets = tickets_for(new_balance, period_days)?;

        self.balances.insert(account_id, &new_balance);
        self.tickets.insert(account_id, &new_tickets);

        self.total_deposits = self
            .total_deposits
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow)?;
        self.total_tickets = self
            .total_tickets
            .checked_add(new_tickets - old_tickets)
            .ok_or(PoolError::ArithmeticOverflow)?;

        if was_empty {
            self.depositors.insert(account_id, ());
        }

        debug_assert_eq!(self.balance_of(account_id), new_balance);
        Ok(())
    }

    /// Debits `amount` from `account_id`. Requires `amount <= balance_of(account_id)`.
    /// Removes the account from the depositor list once its balance reaches zero.
    pub fn debit(
        &mut self,
        account_id: &AccountId,
        amount: Balance,
        period_days: Period,
    ) -> Result<(), PoolError> {
        let current = self.balance_of(account_id);
        if amount > current {
            return Err(PoolError::InsufficientBalance {
                have: current,
                requested: amount,
            });
        }

        let new_balance = current - amount;
        let old_tickets = self.tickets_of(account_id);
        let new_tickets = tickets_for(new_balance, period_days)?;

        if new_balance == 0 {
            self.balances.remove(account_id);
            self.tickets.remove(account_id);
            self.depositors.remove(account_id);
        } else {
            self.balances.insert(account_id, &new_balance);
            self.tickets.insert(account_id, &new_tickets);
        }

        self.total_deposits -= amount;
        self.total_tickets -= old_tickets - new_tickets;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_sdk::test_utils::{accounts, VMContextBuilder};
    use near_sdk::testing_env;

    fn setup() {
        testing_env!(VMContextBuilder::new().build());
    }

    #[test]
    fn credit_adds_to_depositor_list_once() {
        setup();
        let mut ledger = Ledger::new();
        let alice = accounts(0);

        ledger.credit(&alice, 100, 7).unwrap();
        assert_eq!(ledger.balance_of(&alice), 100);
        assert_eq!(ledger.tickets_of(&alice), 700);
        assert_eq!(ledger.total_deposits(), 100);
        assert_eq!(ledger.total_tickets(), 700);
        assert_eq!(ledger.depositor_count(), 1);

        // A second credit updates the existing entry rather than re-inserting it.
        ledger.credit(&alice, 50, 7).unwrap();
        assert_eq!(ledger.balance_of(&alice), 150);
        assert_eq!(ledger.tickets_of(&alice), 1050);
        assert_eq!(ledger.depositor_count(), 1);
    }

    #[test]
    fn partial_debit_keeps_depositor_listed() {
        setup();
        let mut ledger = Ledger::new();
        let alice = accounts(0);

        ledger.credit(&alice, 100, 7).unwrap();
        ledger.debit(&alice, 40, 7).unwrap();

        assert_eq!(ledger.balance_of(&alice), 60);
        assert_eq!(ledger.tickets_of(&alice), 420);
        assert_eq!(ledger.total_deposits(), 60);
        assert_eq!(ledger.total_tickets(), 420);
        assert_eq!(ledger.depositor_count(), 1);
    }

    #[test]
    fn full_debit_removes_depositor() {
        setup();
        let mut ledger = Ledger::new();
        let alice = accounts(0);

        ledger.credit(&alice, 50, 7).unwrap();
        ledger.debit(&alice, 50, 7).unwrap();

        assert_eq!(ledger.balance_of(&alice), 0);
        assert_eq!(ledger.tickets_of(&alice), 0);
        assert_eq!(ledger.total_deposits(), 0);
        assert_eq!(ledger.total_tickets(), 0);
        assert_eq!(ledger.depositor_count(), 0);
        assert_eq!(ledger.iter_depositors().count(), 0);
    }

    #[test]
    fn debit_more_than_balance_is_rejected() {
        setup();
        let mut ledger = Ledger::new();
        let alice = accounts(0);

        ledger.credit(&alice, 50, 7).unwrap();
        assert!(matches!(
            ledger.debit(&alice, 51, 7),
            Err(PoolError::InsufficientBalance {
                have: 50,
                requested: 51
            })
        ));
        // A rejected debit must not have touched the balance.
        assert_eq!(ledger.balance_of(&alice), 50);
    }

    #[test]
    fn totals_track_multiple_depositors() {
        setup();
        let mut ledger = Ledger::new();
        let alice = accounts(0);
        let bob = accounts(1);

        ledger.credit(&alice, 100, 7).unwrap();
        ledger.credit(&bob, 300, 7).unwrap();

        assert_eq!(ledger.total_deposits(), 400);
        assert_eq!(ledger.total_tickets(), 700 + 2100);

        let mut walked: Vec<_> = ledger.iter_depositors().collect();
        walked.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(walked, vec![(alice, 700), (bob, 2100)]);
    }
}
