use std::collections::BTreeMap;

use anchor_lang::prelude::*;

/// Balance and allowance storage the transfer pipeline runs against.
///
/// On-chain this is backed by program accounts loaded for one instruction
/// (see [`crate::account_ledger::AccountsLedger`]); tests and simulations use
/// [`MemoryLedger`].
pub trait Ledger {
    fn balance_of(&self, holder: &Pubkey) -> Result<u128>;

    fn set_balance(&mut self, holder: &Pubkey, amount: u128) -> Result<()>;

    fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> Result<u128>;

    fn set_allowance(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u128) -> Result<()>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    balances: BTreeMap<Pubkey, u128>,
    allowances: BTreeMap<(Pubkey, Pubkey), u128>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holders(&self) -> impl Iterator<Item = (&Pubkey, &u128)> {
        self.balances.iter()
    }

    /// Sum of every recorded balance; `None` on overflow.
    pub fn sum_of_balances(&self) -> Option<u128> {
        self.balances
            .values()
            .try_fold(0u128, |total, amount| total.checked_add(*amount))
    }
}

impl Ledger for MemoryLedger {
    fn balance_of(&self, holder: &Pubkey) -> Result<u128> {
        Ok(self.balances.get(holder).copied().unwrap_or(0))
    }

    fn set_balance(&mut self, holder: &Pubkey, amount: u128) -> Result<()> {
        if amount == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(*holder, amount);
        }
        Ok(())
    }

    fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> Result<u128> {
        Ok(self
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0))
    }

    fn set_allowance(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u128) -> Result<()> {
        if amount == 0 {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JournalEntry {
    Balance { holder: Pubkey, previous: u128 },
    Allowance { owner: Pubkey, spender: Pubkey, previous: u128 },
    Supply { previous: u128 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Undo log of every write made during one call, so a failure anywhere in
/// the call (or in a nested liquify cycle) can restore the state exactly.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.entries.len())
    }

    pub fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Removes and returns, newest first, every entry recorded after
    /// `checkpoint`.
    pub fn unwind(&mut self, checkpoint: Checkpoint) -> Vec<JournalEntry> {
        let mut undone = self.entries.split_off(checkpoint.0.min(self.entries.len()));
        undone.reverse();
        undone
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_ledger_defaults_to_zero() {
        let ledger = MemoryLedger::new();
        let holder = Pubkey::new_unique();
        assert_eq!(ledger.balance_of(&holder).unwrap(), 0);
        assert_eq!(ledger.allowance(&holder, &holder).unwrap(), 0);
        assert_eq!(ledger.sum_of_balances(), Some(0));
    }

    #[test]
    fn zero_balances_are_pruned() {
        let mut ledger = MemoryLedger::new();
        let holder = Pubkey::new_unique();
        ledger.set_balance(&holder, 10).unwrap();
        assert_eq!(ledger.holders().count(), 1);
        ledger.set_balance(&holder, 0).unwrap();
        assert_eq!(ledger.holders().count(), 0);
    }

    #[test]
    fn unwind_returns_newest_first() {
        let mut journal = Journal::default();
        let holder = Pubkey::new_unique();
        journal.record(JournalEntry::Supply { previous: 1 });
        let checkpoint = journal.checkpoint();
        journal.record(JournalEntry::Balance { holder, previous: 2 });
        journal.record(JournalEntry::Supply { previous: 3 });

        let undone = journal.unwind(checkpoint);
        assert_eq!(
            undone,
            vec![
                JournalEntry::Supply { previous: 3 },
                JournalEntry::Balance { holder, previous: 2 },
            ]
        );
        assert_eq!(journal.len(), 1);
    }
}
