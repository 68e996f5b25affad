use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::errors::TokenError;
use crate::ledger::Ledger;
use crate::state::{Allowance, HolderBalance};

/// [`Ledger`] over the balance and allowance accounts loaded for one
/// instruction.
///
/// Values are cached per holder, so the same account passed twice (a
/// self-transfer, or the pair showing up both as a named account and among
/// the router accounts) reads and writes one value. [`AccountsLedger::commit`]
/// writes the final amounts back into every loaded account.
///
/// Allowances without a loaded account live only for the instruction. The
/// liquify cycle's router approval is one of these.
pub struct AccountsLedger<'a, 'info> {
    config: Pubkey,
    balance_accounts: Vec<&'a mut Account<'info, HolderBalance>>,
    allowance_accounts: Vec<&'a mut Account<'info, Allowance>>,
    balances: BTreeMap<Pubkey, u128>,
    allowances: BTreeMap<(Pubkey, Pubkey), u128>,
}

impl<'a, 'info> AccountsLedger<'a, 'info> {
    pub fn new(config: Pubkey) -> Self {
        Self {
            config,
            balance_accounts: Vec::new(),
            allowance_accounts: Vec::new(),
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    pub fn track_balance(&mut self, account: &'a mut Account<'info, HolderBalance>) -> Result<()> {
        require_keys_eq!(account.config, self.config, TokenError::InvalidBalanceAccount);
        self.balances.entry(account.holder).or_insert(account.amount);
        self.balance_accounts.push(account);
        Ok(())
    }

    pub fn track_allowance(&mut self, account: &'a mut Account<'info, Allowance>) -> Result<()> {
        require_keys_eq!(account.config, self.config, TokenError::InvalidBalanceAccount);
        self.allowances
            .entry((account.owner, account.spender))
            .or_insert(account.amount);
        self.allowance_accounts.push(account);
        Ok(())
    }

    pub fn commit(self) {
        for account in self.balance_accounts {
            if let Some(amount) = self.balances.get(&account.holder) {
                account.amount = *amount;
            }
        }
        for account in self.allowance_accounts {
            if let Some(amount) = self.allowances.get(&(account.owner, account.spender)) {
                account.amount = *amount;
            }
        }
    }
}

impl Ledger for AccountsLedger<'_, '_> {
    fn balance_of(&self, holder: &Pubkey) -> Result<u128> {
        self.balances
            .get(holder)
            .copied()
            .ok_or_else(|| error!(TokenError::MissingBalanceAccount))
    }

    fn set_balance(&mut self, holder: &Pubkey, amount: u128) -> Result<()> {
        let slot = self
            .balances
            .get_mut(holder)
            .ok_or(TokenError::MissingBalanceAccount)?;
        *slot = amount;
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
        self.allowances.insert((*owner, *spender), amount);
        Ok(())
    }
}

impl HolderBalance {
    /// Fills in a balance account that `init_if_needed` just created.
    pub fn ensure_open(&mut self, config: Pubkey, holder: Pubkey, bump: u8) {
        if self.config == Pubkey::default() {
            self.config = config;
            self.holder = holder;
            self.amount = 0;
            self.bump = bump;
        }
    }
}

impl Allowance {
    pub fn ensure_open(&mut self, config: Pubkey, owner: Pubkey, spender: Pubkey, bump: u8) {
        if self.config == Pubkey::default() {
            self.config = config;
            self.owner = owner;
            self.spender = spender;
            self.amount = 0;
            self.bump = bump;
        }
    }
}

/// Deserializes a balance account passed through `remaining_accounts`.
/// Anchor checks the owner and discriminator; the config link is checked
/// here.
pub fn load_balance_account<'info>(
    info: &'info AccountInfo<'info>,
    config: &Pubkey,
) -> Result<Account<'info, HolderBalance>> {
    let account = Account::<HolderBalance>::try_from(info)?;
    require_keys_eq!(account.config, *config, TokenError::InvalidBalanceAccount);
    require!(info.is_writable, TokenError::InvalidBalanceAccount);
    Ok(account)
}
