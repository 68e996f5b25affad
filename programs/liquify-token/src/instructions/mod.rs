pub mod admin;
pub mod approve;
pub mod initialize;
pub mod mint;
pub mod open_balance;
pub mod transfer;

use anchor_lang::prelude::*;

use crate::account_ledger::{load_balance_account, AccountsLedger};
use crate::errors::TokenError;
use crate::liquidity::LiquidityVenue;
use crate::router_cpi::{RouterCpi, TokenSigner};
use crate::state::{Allowance, HolderBalance, TokenConfig};
use crate::token::Token;

pub type OnChainToken<'a, 'info> = Token<AccountsLedger<'a, 'info>, RouterCpi<'info>>;

/// Runs `op` against a [`Token`] assembled from the instruction's accounts
/// and writes the resulting state back only if it succeeds.
pub(crate) fn run<'a, 'info, R>(
    config: &mut Account<'info, TokenConfig>,
    balances: Vec<&'a mut Account<'info, HolderBalance>>,
    allowances: Vec<&'a mut Account<'info, Allowance>>,
    venue: Option<RouterCpi<'info>>,
    op: impl FnOnce(&mut OnChainToken<'a, 'info>) -> Result<R>,
) -> Result<R> {
    let address = config.key();
    let mut ledger = AccountsLedger::new(address);
    for account in balances {
        ledger.track_balance(account)?;
    }
    for account in allowances {
        ledger.track_allowance(account)?;
    }

    let mut token = Token::new(address, TokenConfig::clone(config), ledger)
        .at(Clock::get()?.unix_timestamp);
    if let Some(venue) = venue {
        token = token.with_venue(venue);
    }
    let output = op(&mut token)?;

    let (state, ledger) = token.into_parts();
    ledger.commit();
    config.set_inner(state);
    Ok(output)
}

/// Accounts a transfer needs to run the liquidity cycle. Present only when
/// the caller appended them after the named accounts.
pub(crate) struct LiquifyAccounts<'info> {
    pub pair_balance: Account<'info, HolderBalance>,
    pub venue: RouterCpi<'info>,
}

pub(crate) fn load_liquify_accounts<'info>(
    remaining: &'info [AccountInfo<'info>],
    config: &Account<'info, TokenConfig>,
) -> Result<Option<LiquifyAccounts<'info>>> {
    if remaining.is_empty() {
        return Ok(None);
    }
    let (Some(router), Some(pair)) = (config.liquidity.router, config.liquidity.pair) else {
        return err!(TokenError::VenueNotConfigured);
    };

    let token = config.key();
    let venue = RouterCpi::from_remaining_accounts(
        remaining,
        config.to_account_info(),
        TokenSigner {
            identity: config.identity,
            bump: config.bump,
        },
    )?;
    require_keys_eq!(venue.router(), router, TokenError::InvalidRouterAccounts);
    require_keys_eq!(
        RouterCpi::pair_address(&router, &token, &venue.base_currency()),
        pair,
        TokenError::InvalidRouterAccounts
    );

    let pair_info = remaining
        .get(1)
        .ok_or(TokenError::InvalidRouterAccounts)?;
    let pair_balance = load_balance_account(pair_info, &token)?;
    require_keys_eq!(pair_balance.holder, pair, TokenError::InvalidRouterAccounts);

    Ok(Some(LiquifyAccounts {
        pair_balance,
        venue,
    }))
}
