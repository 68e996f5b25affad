#![allow(dead_code)]

use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_error::ProgramError;

use liquify_token::errors::TokenError;
use liquify_token::ledger::MemoryLedger;
use liquify_token::liquidity::{LiquidityReceipt, LiquidityVenue, VenueHost};
use liquify_token::state::TokenConfig;
use liquify_token::token::Token;

pub type TestToken = Token<MemoryLedger, MockVenue>;

pub const SUPPLY: u128 = 10_000_000;

/// Fixed-price venue. The pool pair is an ordinary token holder; base
/// currency and LP shares are tracked here.
#[derive(Debug)]
pub struct MockVenue {
    pub router: Pubkey,
    pub base: Pubkey,
    pub pair: Pubkey,
    /// Base units paid per two tokens sold.
    pub base_per_two_tokens: u128,
    pub base_balances: BTreeMap<Pubkey, u128>,
    pub lp_balances: BTreeMap<Pubkey, u128>,
    /// Tokens handed back to the seller on every `add_liquidity`.
    pub refund: u128,
    pub fail_swap: bool,
    pub fail_add_liquidity: bool,
    /// A user-side `transfer_from` (router as spender) replayed right after
    /// the swap leg, while the cycle still holds the lock.
    pub reenter: Option<Reentry>,
    pub swaps: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct Reentry {
    pub owner: Pubkey,
    pub recipient: Pubkey,
    pub amount: u128,
}

impl MockVenue {
    pub fn new() -> Self {
        Self {
            router: Pubkey::new_unique(),
            base: Pubkey::new_unique(),
            pair: Pubkey::new_unique(),
            base_per_two_tokens: 1,
            base_balances: BTreeMap::new(),
            lp_balances: BTreeMap::new(),
            refund: 0,
            fail_swap: false,
            fail_add_liquidity: false,
            reenter: None,
            swaps: 0,
        }
    }

    pub fn lp_of(&self, holder: &Pubkey) -> u128 {
        self.lp_balances.get(holder).copied().unwrap_or(0)
    }

    pub fn base_of(&self, holder: &Pubkey) -> u128 {
        self.base_balances.get(holder).copied().unwrap_or(0)
    }
}

impl LiquidityVenue for MockVenue {
    fn router(&self) -> Pubkey {
        self.router
    }

    fn base_currency(&self) -> Pubkey {
        self.base
    }

    fn pair_for(&mut self, _token: &Pubkey) -> Result<Pubkey> {
        Ok(self.pair)
    }

    fn swap_exact_tokens_for_base(
        &mut self,
        host: &mut dyn VenueHost,
        amount_in: u128,
        path: &[Pubkey],
    ) -> Result<u128> {
        let token = host.token_address();
        assert_eq!(path, &[token, self.base]);

        host.transfer_from(self.router, token, self.pair, amount_in)?;
        if let Some(reentry) = self.reenter {
            host.transfer_from(self.router, reentry.owner, reentry.recipient, reentry.amount)?;
        }
        if self.fail_swap {
            return err!(TokenError::VenueFailure);
        }

        let base_out = amount_in * self.base_per_two_tokens / 2;
        *self.base_balances.entry(token).or_default() += base_out;
        self.swaps += 1;
        Ok(base_out)
    }

    fn add_liquidity(
        &mut self,
        host: &mut dyn VenueHost,
        token_amount: u128,
        base_amount: u128,
        recipient: Pubkey,
    ) -> Result<LiquidityReceipt> {
        let token = host.token_address();
        host.transfer_from(self.router, token, self.pair, token_amount)?;
        if self.fail_add_liquidity {
            return err!(TokenError::VenueFailure);
        }

        let refund = self.refund.min(token_amount);
        if refund > 0 {
            host.transfer(self.pair, token, refund)?;
        }
        let token_used = token_amount - refund;

        let base = self.base_balances.entry(token).or_default();
        let base_used = base_amount.min(*base);
        *base -= base_used;

        *self.lp_balances.entry(recipient).or_default() += token_used;
        Ok(LiquidityReceipt {
            token_used,
            base_used,
            lp_minted: token_used,
        })
    }
}

pub struct Fixture {
    pub token: TestToken,
    pub owner: Pubkey,
    pub alice: Pubkey,
    pub bob: Pubkey,
}

/// Token with `SUPPLY` minted to `alice` and default rates.
pub fn fixture() -> Fixture {
    fixture_with_supply(SUPPLY)
}

pub fn fixture_with_supply(supply: u128) -> Fixture {
    let address = Pubkey::new_unique();
    let owner = Pubkey::new_unique();
    let config = TokenConfig::new(Pubkey::new_unique(), owner, address, 255);
    let mut token = Token::new(address, config, MemoryLedger::new());

    let alice = Pubkey::new_unique();
    token.mint(owner, alice, supply).unwrap();

    Fixture {
        token,
        owner,
        alice,
        bob: Pubkey::new_unique(),
    }
}

/// `fixture()` with `venue` attached, auto-liquify on and the given
/// threshold.
pub fn liquifying_fixture(venue: MockVenue, min_amount: u128) -> Fixture {
    let mut fixture = fixture();
    let owner = fixture.owner;
    let token = &mut fixture.token;
    token.update_liquidity_venue_router(owner, venue).unwrap();
    token.update_swap_and_liquify_enabled(owner, true).unwrap();
    token.update_min_amount_to_liquify(owner, min_amount).unwrap();
    fixture
}

pub fn venue(token: &TestToken) -> &MockVenue {
    token.venue().expect("venue attached")
}

pub fn balance(token: &TestToken, holder: &Pubkey) -> u128 {
    token.balance_of(holder).unwrap()
}

/// `(from, to, amount)` of every transfer leg the last transfer logged.
pub fn legs(token: &TestToken) -> Vec<(Pubkey, Pubkey, u128)> {
    token
        .settled_transfers()
        .iter()
        .map(|leg| (leg.from, leg.to, leg.amount))
        .collect()
}

pub fn assert_conserved(token: &TestToken) {
    assert_eq!(token.ledger().sum_of_balances(), Some(token.total_supply()));
}

pub fn assert_token_error<T: std::fmt::Debug>(result: Result<T>, expected: TokenError) {
    let err = result.expect_err("call should fail");
    assert_eq!(
        ProgramError::from(err),
        ProgramError::Custom(u32::from(expected))
    );
}
