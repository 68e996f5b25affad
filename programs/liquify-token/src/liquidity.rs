use std::cell::Cell;
use std::rc::Rc;

use anchor_lang::prelude::*;

use crate::errors::TokenError;
use crate::state::LiquidityConfig;

/// The token as seen by a liquidity venue while a swap-and-liquify cycle is
/// running. Every call re-enters the transfer pipeline and therefore
/// observes the held swap lock.
pub trait VenueHost {
    fn token_address(&self) -> Pubkey;

    fn balance_of(&self, holder: &Pubkey) -> Result<u128>;

    /// Moves tokens out of a holder the venue controls (the pool pair).
    fn transfer(&mut self, sender: Pubkey, recipient: Pubkey, amount: u128) -> Result<()>;

    /// Pulls tokens on behalf of `spender` against an allowance granted by
    /// `owner`.
    fn transfer_from(
        &mut self,
        spender: Pubkey,
        owner: Pubkey,
        recipient: Pubkey,
        amount: u128,
    ) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiquidityReceipt {
    pub token_used: u128,
    pub base_used: u128,
    pub lp_minted: u128,
}

/// External trading venue: a router in front of a single token/base pool.
pub trait LiquidityVenue {
    fn router(&self) -> Pubkey;

    /// Mint (or wrapped mint) of the base currency the pool trades against.
    fn base_currency(&self) -> Pubkey;

    /// Pool pair for `token`, created on the venue if it does not exist yet.
    fn pair_for(&mut self, token: &Pubkey) -> Result<Pubkey>;

    /// Single-hop swap of exactly `amount_in` tokens; returns the base
    /// currency received.
    fn swap_exact_tokens_for_base(
        &mut self,
        host: &mut dyn VenueHost,
        amount_in: u128,
        path: &[Pubkey],
    ) -> Result<u128>;

    fn add_liquidity(
        &mut self,
        host: &mut dyn VenueHost,
        token_amount: u128,
        base_amount: u128,
        recipient: Pubkey,
    ) -> Result<LiquidityReceipt>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiquifyState {
    Idle,
    Swapping,
}

/// Process-wide reentrancy flag for the swap-and-liquify cycle.
#[derive(Clone, Debug, Default)]
pub struct SwapLock(Rc<Cell<bool>>);

impl SwapLock {
    pub fn state(&self) -> LiquifyState {
        if self.0.get() {
            LiquifyState::Swapping
        } else {
            LiquifyState::Idle
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state() == LiquifyState::Swapping
    }

    /// `None` while another cycle holds the lock.
    pub fn try_acquire(&self) -> Option<SwapGuard> {
        if self.0.replace(true) {
            return None;
        }
        Some(SwapGuard(Rc::clone(&self.0)))
    }
}

/// Holds the swap lock until dropped, whichever way the cycle exits.
#[derive(Debug)]
pub struct SwapGuard(Rc<Cell<bool>>);

impl Drop for SwapGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl LiquidityConfig {
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.swap_and_liquify_enabled, enabled)
    }

    pub fn set_min_amount_to_liquify(&mut self, amount: u128) -> u128 {
        std::mem::replace(&mut self.min_amount_to_liquify, amount)
    }

    pub fn set_venue(&mut self, router: Pubkey, pair: Pubkey) -> Result<()> {
        require_keys_neq!(router, Pubkey::default(), TokenError::InvalidAddress);
        require_keys_neq!(pair, Pubkey::default(), TokenError::InvalidAddress);
        self.router = Some(router);
        self.pair = Some(pair);
        Ok(())
    }

    pub fn is_pair(&self, account: &Pubkey) -> bool {
        self.pair.as_ref() == Some(account)
    }

    /// Whether a transfer from `sender` that left the token holding
    /// `token_balance` should start a swap-and-liquify cycle.
    pub fn should_liquify(&self, lock: &SwapLock, token_balance: u128, sender: &Pubkey) -> bool {
        self.swap_and_liquify_enabled
            && !lock.is_locked()
            && self.router.is_some()
            && self.pair.is_some()
            && token_balance >= self.min_amount_to_liquify
            && !self.is_pair(sender)
    }
}
