use anchor_lang::prelude::*;

use crate::access::{self, authorize, Role};
use crate::anti_whale::{self, set_membership};
use crate::constants::{BURN_ADDRESS, MAX_EXCLUDED_FROM_FEE};
use crate::errors::TokenError;
use crate::events::{
    AntiWhaleExclusionUpdated, Approval, BurnRateUpdated, FeeExclusionUpdated, LiquidityRouterUpdated,
    LiquifyFailed, MaxTransferAmountRateUpdated, MinAmountToLiquifyUpdated, OperatorTransferred,
    SwapAndLiquify, SwapAndLiquifyEnabledUpdated, TokensMinted, Transfer, TransferTaxRateUpdated,
    TransferTaxed,
};
use crate::fee::FeeSplit;
use crate::ledger::{Checkpoint, Journal, JournalEntry, Ledger};
use crate::liquidity::{LiquidityVenue, LiquifyState, SwapLock, VenueHost};
use crate::state::TokenConfig;

/// One token instance: configuration, ledger and the attached liquidity
/// venue. Every transfer runs the fee / anti-whale / auto-liquify pipeline.
///
/// Public operations are atomic. Writes go through a [`Journal`] and are
/// undone if the call fails at any point. Transfer events are held back
/// until the call succeeds, so a rolled-back liquify cycle logs nothing.
pub struct Token<L, V> {
    address: Pubkey,
    config: TokenConfig,
    ledger: L,
    venue: Option<V>,
    lock: SwapLock,
    journal: Journal,
    deferred: Vec<Deferred>,
    settled: Vec<Transfer>,
    now: i64,
}

enum Deferred {
    Transfer(Transfer),
    Taxed(TransferTaxed),
    Liquified(SwapAndLiquify),
    LiquifyFailed(LiquifyFailed),
}

/// Journal and event positions to rewind to.
#[derive(Clone, Copy)]
struct Mark {
    journal: Checkpoint,
    deferred: usize,
}

impl<L: Ledger, V: LiquidityVenue> Token<L, V> {
    pub fn new(address: Pubkey, config: TokenConfig, ledger: L) -> Self {
        Self {
            address,
            config,
            ledger,
            venue: None,
            lock: SwapLock::default(),
            journal: Journal::default(),
            deferred: Vec::new(),
            settled: Vec::new(),
            now: 0,
        }
    }

    /// Attaches the venue for an already configured router without touching
    /// the configuration.
    pub fn with_venue(mut self, venue: V) -> Self {
        self.venue = Some(venue);
        self
    }

    /// Unix time stamped on configuration events.
    pub fn at(mut self, timestamp: i64) -> Self {
        self.now = timestamp;
        self
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn venue(&self) -> Option<&V> {
        self.venue.as_ref()
    }

    pub fn liquify_state(&self) -> LiquifyState {
        self.lock.state()
    }

    /// Transfer legs logged by the last successful transfer, in order.
    pub fn settled_transfers(&self) -> &[Transfer] {
        &self.settled
    }

    pub fn into_parts(self) -> (TokenConfig, L) {
        (self.config, self.ledger)
    }

    // ---- ledger surface ----

    pub fn mint(&mut self, caller: Pubkey, recipient: Pubkey, amount: u128) -> Result<()> {
        authorize(&self.config, &caller, Role::Owner)?;
        require_keys_neq!(recipient, Pubkey::default(), TokenError::InvalidAddress);

        let result = self.atomically(|token| {
            let supply = token
                .config
                .total_supply
                .checked_add(amount)
                .ok_or(TokenError::Overflow)?;
            token.write_supply(supply);
            token.credit(&recipient, amount)?;

            emit!(Transfer {
                token: token.address,
                from: Pubkey::default(),
                to: recipient,
                amount,
            });
            emit!(TokensMinted {
                token: token.address,
                recipient,
                amount,
                new_total_supply: supply,
            });
            Ok(())
        });
        self.journal.clear();
        result
    }

    pub fn transfer(&mut self, caller: Pubkey, recipient: Pubkey, amount: u128) -> Result<()> {
        let result = self.transfer_internal(caller, recipient, amount);
        self.settle(result)
    }

    pub fn transfer_from(
        &mut self,
        spender: Pubkey,
        owner: Pubkey,
        recipient: Pubkey,
        amount: u128,
    ) -> Result<()> {
        let result = self.spend_and_transfer(spender, owner, recipient, amount);
        self.settle(result)
    }

    pub fn approve(&mut self, caller: Pubkey, spender: Pubkey, amount: u128) -> Result<()> {
        let result = self.approve_internal(caller, spender, amount);
        self.journal.clear();
        result
    }

    // ---- views ----

    pub fn balance_of(&self, holder: &Pubkey) -> Result<u128> {
        self.ledger.balance_of(holder)
    }

    pub fn total_supply(&self) -> u128 {
        self.config.total_supply
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> Result<u128> {
        self.ledger.allowance(owner, spender)
    }

    pub fn owner(&self) -> Pubkey {
        self.config.owner
    }

    pub fn operator(&self) -> Pubkey {
        self.config.operator
    }

    pub fn transfer_tax_rate(&self) -> u16 {
        self.config.fees.transfer_tax_rate
    }

    pub fn burn_rate(&self) -> u16 {
        self.config.fees.burn_rate
    }

    pub fn max_transfer_amount_rate(&self) -> u16 {
        self.config.anti_whale.max_transfer_amount_rate
    }

    pub fn max_transfer_amount(&self) -> Result<u128> {
        anti_whale::max_transfer_amount(
            self.config.total_supply,
            self.config.anti_whale.max_transfer_amount_rate,
        )
    }

    pub fn is_excluded_from_anti_whale(&self, account: &Pubkey) -> bool {
        self.config.anti_whale.is_excluded(account)
    }

    pub fn is_excluded_from_fee(&self, account: &Pubkey) -> bool {
        self.config.fee_exempt.contains(account)
    }

    pub fn swap_and_liquify_enabled(&self) -> bool {
        self.config.liquidity.swap_and_liquify_enabled
    }

    pub fn min_amount_to_liquify(&self) -> u128 {
        self.config.liquidity.min_amount_to_liquify
    }

    pub fn liquidity_router(&self) -> Option<Pubkey> {
        self.config.liquidity.router
    }

    pub fn liquidity_pair(&self) -> Option<Pubkey> {
        self.config.liquidity.pair
    }

    // ---- admin surface ----

    pub fn update_transfer_tax_rate(&mut self, caller: Pubkey, rate: u16) -> Result<()> {
        authorize(&self.config, &caller, Role::Operator)?;
        let previous_rate = self.config.fees.set_transfer_tax_rate(rate)?;
        emit!(TransferTaxRateUpdated {
            token: self.address,
            timestamp: self.now,
            operator: caller,
            previous_rate,
            new_rate: rate,
        });
        Ok(())
    }

    pub fn update_burn_rate(&mut self, caller: Pubkey, rate: u16) -> Result<()> {
        authorize(&self.config, &caller, Role::Operator)?;
        let previous_rate = self.config.fees.set_burn_rate(rate)?;
        emit!(BurnRateUpdated {
            token: self.address,
            timestamp: self.now,
            operator: caller,
            previous_rate,
            new_rate: rate,
        });
        Ok(())
    }

    /// A rate of 0 yields a zero cap, which lifts the anti-whale limit
    /// entirely (see [`anti_whale::UNLIMITED_CAP`]).
    pub fn update_max_transfer_amount_rate(&mut self, caller: Pubkey, rate: u16) -> Result<()> {
        authorize(&self.config, &caller, Role::Operator)?;
        let previous_rate = self
            .config
            .anti_whale
            .set_max_transfer_amount_rate(rate)?;
        emit!(MaxTransferAmountRateUpdated {
            token: self.address,
            timestamp: self.now,
            operator: caller,
            previous_rate,
            new_rate: rate,
        });
        Ok(())
    }

    pub fn update_swap_and_liquify_enabled(&mut self, caller: Pubkey, enabled: bool) -> Result<()> {
        authorize(&self.config, &caller, Role::Operator)?;
        self.config.liquidity.set_enabled(enabled);
        emit!(SwapAndLiquifyEnabledUpdated {
            token: self.address,
            timestamp: self.now,
            operator: caller,
            enabled,
        });
        Ok(())
    }

    pub fn update_min_amount_to_liquify(&mut self, caller: Pubkey, amount: u128) -> Result<()> {
        authorize(&self.config, &caller, Role::Operator)?;
        let previous_amount = self.config.liquidity.set_min_amount_to_liquify(amount);
        emit!(MinAmountToLiquifyUpdated {
            token: self.address,
            timestamp: self.now,
            operator: caller,
            previous_amount,
            new_amount: amount,
        });
        Ok(())
    }

    pub fn set_excluded_from_anti_whale(
        &mut self,
        caller: Pubkey,
        account: Pubkey,
        excluded: bool,
    ) -> Result<()> {
        authorize(&self.config, &caller, Role::Operator)?;
        self.config.anti_whale.set_excluded(account, excluded)?;
        emit!(AntiWhaleExclusionUpdated {
            token: self.address,
            timestamp: self.now,
            account,
            excluded,
        });
        Ok(())
    }

    pub fn set_excluded_from_fee(
        &mut self,
        caller: Pubkey,
        account: Pubkey,
        excluded: bool,
    ) -> Result<()> {
        authorize(&self.config, &caller, Role::Operator)?;
        set_membership(
            &mut self.config.fee_exempt,
            account,
            excluded,
            MAX_EXCLUDED_FROM_FEE,
        )?;
        emit!(FeeExclusionUpdated {
            token: self.address,
            timestamp: self.now,
            account,
            excluded,
        });
        Ok(())
    }

    /// Points auto-liquify at `venue`, recording its pool pair for this token.
    pub fn update_liquidity_venue_router(&mut self, caller: Pubkey, mut venue: V) -> Result<()> {
        authorize(&self.config, &caller, Role::Operator)?;
        let router = venue.router();
        let pair = venue.pair_for(&self.address)?;
        self.config.liquidity.set_venue(router, pair)?;
        self.venue = Some(venue);

        emit!(LiquidityRouterUpdated {
            token: self.address,
            timestamp: self.now,
            operator: caller,
            router,
            pair,
        });
        Ok(())
    }

    pub fn transfer_operator(&mut self, caller: Pubkey, new_operator: Pubkey) -> Result<()> {
        let previous_operator = access::transfer_operator(&mut self.config, &caller, new_operator)?;
        emit!(OperatorTransferred {
            token: self.address,
            timestamp: self.now,
            previous_operator,
            new_operator,
        });
        Ok(())
    }

    // ---- pipeline ----

    fn transfer_internal(&mut self, sender: Pubkey, recipient: Pubkey, amount: u128) -> Result<()> {
        self.atomically(|token| {
            token.move_tokens(sender, recipient, amount)?;
            token.maybe_swap_and_liquify(&sender)
        })
    }

    fn spend_and_transfer(
        &mut self,
        spender: Pubkey,
        owner: Pubkey,
        recipient: Pubkey,
        amount: u128,
    ) -> Result<()> {
        self.atomically(|token| {
            token.move_tokens(owner, recipient, amount)?;
            let allowed = token.ledger.allowance(&owner, &spender)?;
            require!(allowed >= amount, TokenError::InsufficientAllowance);
            token.write_allowance(&owner, &spender, allowed - amount)?;
            token.maybe_swap_and_liquify(&owner)
        })
    }

    fn approve_internal(&mut self, owner: Pubkey, spender: Pubkey, amount: u128) -> Result<()> {
        require_keys_neq!(owner, Pubkey::default(), TokenError::InvalidAddress);
        require_keys_neq!(spender, Pubkey::default(), TokenError::InvalidAddress);
        self.atomically(|token| token.write_allowance(&owner, &spender, amount))?;
        emit!(Approval {
            token: self.address,
            owner,
            spender,
            amount,
        });
        Ok(())
    }

    /// Cap check, fee split and the balance moves of a single transfer.
    fn move_tokens(&mut self, sender: Pubkey, recipient: Pubkey, amount: u128) -> Result<()> {
        require_keys_neq!(sender, Pubkey::default(), TokenError::InvalidAddress);
        require_keys_neq!(recipient, Pubkey::default(), TokenError::InvalidAddress);

        let cap = self.max_transfer_amount()?;
        let exempt = anti_whale::is_exempt(&self.address, &self.config, &sender, &recipient);
        anti_whale::check_transfer(amount, cap, exempt)?;

        let split = if self.is_fee_free(&sender, &recipient) {
            FeeSplit::default()
        } else {
            self.config.fees.compute_fee(amount)?
        };
        let net = amount.checked_sub(split.tax).ok_or(TokenError::Overflow)?;

        self.debit(&sender, amount)?;
        self.credit(&recipient, net)?;
        self.deferred.push(Deferred::Transfer(Transfer {
            token: self.address,
            from: sender,
            to: recipient,
            amount: net,
        }));

        if split.is_zero() {
            return Ok(());
        }

        if split.burn_part > 0 {
            self.credit(&BURN_ADDRESS, split.burn_part)?;
            self.deferred.push(Deferred::Transfer(Transfer {
                token: self.address,
                from: sender,
                to: BURN_ADDRESS,
                amount: split.burn_part,
            }));
        }
        if split.liquidity_part > 0 {
            let token_address = self.address;
            self.credit(&token_address, split.liquidity_part)?;
            self.deferred.push(Deferred::Transfer(Transfer {
                token: self.address,
                from: sender,
                to: token_address,
                amount: split.liquidity_part,
            }));
        }
        self.deferred.push(Deferred::Taxed(TransferTaxed {
            token: self.address,
            from: sender,
            to: recipient,
            amount,
            tax: split.tax,
            burned: split.burn_part,
            to_liquidity: split.liquidity_part,
        }));
        Ok(())
    }

    fn is_fee_free(&self, sender: &Pubkey, recipient: &Pubkey) -> bool {
        self.lock.is_locked()
            || *sender == self.address
            || *recipient == BURN_ADDRESS
            || self.config.fee_exempt.contains(sender)
            || self.config.fee_exempt.contains(recipient)
            || self.config.fees.transfer_tax_rate == 0
    }

    fn maybe_swap_and_liquify(&mut self, sender: &Pubkey) -> Result<()> {
        let token_balance = self.ledger.balance_of(&self.address)?;
        if !self
            .config
            .liquidity
            .should_liquify(&self.lock, token_balance, sender)
        {
            return Ok(());
        }

        let Some(mut venue) = self.venue.take() else {
            msg!("swap and liquify skipped: no venue attached");
            return Ok(());
        };
        if self.config.liquidity.router != Some(venue.router()) {
            msg!(
                "swap and liquify skipped: venue {} is not the configured router",
                venue.router()
            );
            self.venue = Some(venue);
            return Ok(());
        }
        let Some(_guard) = self.lock.try_acquire() else {
            self.venue = Some(venue);
            return Ok(());
        };

        let mark = self.mark();
        let outcome = self.swap_and_liquify(&mut venue, token_balance);
        self.venue = Some(venue);

        if let Err(err) = outcome {
            msg!("swap and liquify failed, cycle rolled back: {}", err);
            self.rewind(mark)?;
            self.deferred.push(Deferred::LiquifyFailed(LiquifyFailed {
                token: self.address,
                attempted_amount: token_balance,
            }));
        }
        Ok(())
    }

    /// One cycle: sell half the accrued balance for base currency and pair
    /// the other half with it in the pool. Caller holds the swap lock.
    fn swap_and_liquify(&mut self, venue: &mut V, token_balance: u128) -> Result<()> {
        let half = token_balance / 2;
        let other_half = token_balance
            .checked_sub(half)
            .ok_or(TokenError::Overflow)?;

        let token_address = self.address;
        let router = venue.router();
        self.write_allowance(&token_address, &router, token_balance)?;

        let path = [token_address, venue.base_currency()];
        let base_received = venue.swap_exact_tokens_for_base(self, half, &path)?;

        let owner = self.config.owner;
        let receipt = venue.add_liquidity(self, other_half, base_received, owner)?;

        self.deferred.push(Deferred::Liquified(SwapAndLiquify {
            token: token_address,
            tokens_swapped: half,
            base_received,
            tokens_into_liquidity: receipt.token_used,
            lp_minted: receipt.lp_minted,
        }));
        Ok(())
    }

    // ---- journaled writes ----

    fn atomically<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mark = self.mark();
        match op(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.rewind(mark)?;
                Err(err)
            }
        }
    }

    /// Ends a public transfer: drops the undo log and logs the held-back
    /// events only if the call succeeded.
    fn settle(&mut self, result: Result<()>) -> Result<()> {
        self.journal.clear();
        self.settled.clear();
        let deferred = std::mem::take(&mut self.deferred);
        result?;
        for event in deferred {
            match event {
                Deferred::Transfer(leg) => {
                    emit!(leg);
                    self.settled.push(leg);
                }
                Deferred::Taxed(taxed) => emit!(taxed),
                Deferred::Liquified(cycle) => emit!(cycle),
                Deferred::LiquifyFailed(failure) => emit!(failure),
            }
        }
        Ok(())
    }

    fn mark(&self) -> Mark {
        Mark {
            journal: self.journal.checkpoint(),
            deferred: self.deferred.len(),
        }
    }

    fn rewind(&mut self, mark: Mark) -> Result<()> {
        self.deferred.truncate(mark.deferred);
        self.rollback(mark.journal)
    }

    fn rollback(&mut self, checkpoint: Checkpoint) -> Result<()> {
        for entry in self.journal.unwind(checkpoint) {
            match entry {
                JournalEntry::Balance { holder, previous } => {
                    self.ledger.set_balance(&holder, previous)?
                }
                JournalEntry::Allowance {
                    owner,
                    spender,
                    previous,
                } => self.ledger.set_allowance(&owner, &spender, previous)?,
                JournalEntry::Supply { previous } => self.config.total_supply = previous,
            }
        }
        Ok(())
    }

    fn write_balance(&mut self, holder: &Pubkey, amount: u128) -> Result<()> {
        let previous = self.ledger.balance_of(holder)?;
        self.journal.record(JournalEntry::Balance {
            holder: *holder,
            previous,
        });
        self.ledger.set_balance(holder, amount)
    }

    fn write_allowance(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u128) -> Result<()> {
        let previous = self.ledger.allowance(owner, spender)?;
        self.journal.record(JournalEntry::Allowance {
            owner: *owner,
            spender: *spender,
            previous,
        });
        self.ledger.set_allowance(owner, spender, amount)
    }

    fn write_supply(&mut self, amount: u128) {
        self.journal.record(JournalEntry::Supply {
            previous: self.config.total_supply,
        });
        self.config.total_supply = amount;
    }

    fn credit(&mut self, holder: &Pubkey, amount: u128) -> Result<()> {
        let balance = self
            .ledger
            .balance_of(holder)?
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.write_balance(holder, balance)
    }

    fn debit(&mut self, holder: &Pubkey, amount: u128) -> Result<()> {
        let balance = self.ledger.balance_of(holder)?;
        require!(balance >= amount, TokenError::InsufficientBalance);
        self.write_balance(holder, balance - amount)
    }
}

impl<L: Ledger, V: LiquidityVenue> VenueHost for Token<L, V> {
    fn token_address(&self) -> Pubkey {
        self.address
    }

    fn balance_of(&self, holder: &Pubkey) -> Result<u128> {
        self.ledger.balance_of(holder)
    }

    fn transfer(&mut self, sender: Pubkey, recipient: Pubkey, amount: u128) -> Result<()> {
        require!(
            self.lock.is_locked() && self.config.liquidity.is_pair(&sender),
            TokenError::Unauthorized
        );
        self.transfer_internal(sender, recipient, amount)
    }

    fn transfer_from(
        &mut self,
        spender: Pubkey,
        owner: Pubkey,
        recipient: Pubkey,
        amount: u128,
    ) -> Result<()> {
        self.spend_and_transfer(spender, owner, recipient, amount)
    }
}
