use anchor_lang::prelude::*;

use crate::constants::{ALLOWANCE_SEED, BALANCE_SEED, BURN_ADDRESS, CONFIG_SEED};
use crate::state::{Allowance, HolderBalance, TokenConfig};

use super::{load_liquify_accounts, LiquifyAccounts};

/// Plain transfer. Append `[router_program, pair_balance, base_mint,
/// ..router accounts]` to let the transfer run the liquidity cycle.
#[derive(Accounts)]
pub struct TransferTokens<'info> {
    #[account(mut)]
    pub sender: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED, config.identity.as_ref()], bump = config.bump)]
    pub config: Box<Account<'info, TokenConfig>>,

    #[account(
        mut,
        seeds = [BALANCE_SEED, config.key().as_ref(), sender.key().as_ref()],
        bump = sender_balance.bump
    )]
    pub sender_balance: Account<'info, HolderBalance>,

    /// CHECK: transfer destination; only its address is used.
    pub recipient: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = sender,
        space = 8 + HolderBalance::INIT_SPACE,
        seeds = [BALANCE_SEED, config.key().as_ref(), recipient.key().as_ref()],
        bump
    )]
    pub recipient_balance: Account<'info, HolderBalance>,

    #[account(
        mut,
        seeds = [BALANCE_SEED, config.key().as_ref(), config.key().as_ref()],
        bump = vault_balance.bump
    )]
    pub vault_balance: Account<'info, HolderBalance>,

    #[account(
        mut,
        seeds = [BALANCE_SEED, config.key().as_ref(), BURN_ADDRESS.as_ref()],
        bump = burn_balance.bump
    )]
    pub burn_balance: Account<'info, HolderBalance>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct TransferFrom<'info> {
    #[account(mut)]
    pub spender: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED, config.identity.as_ref()], bump = config.bump)]
    pub config: Box<Account<'info, TokenConfig>>,

    /// CHECK: holder whose allowance is spent.
    pub owner: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [BALANCE_SEED, config.key().as_ref(), owner.key().as_ref()],
        bump = owner_balance.bump
    )]
    pub owner_balance: Account<'info, HolderBalance>,

    #[account(
        mut,
        seeds = [
            ALLOWANCE_SEED,
            config.key().as_ref(),
            owner.key().as_ref(),
            spender.key().as_ref()
        ],
        bump = allowance.bump
    )]
    pub allowance: Account<'info, Allowance>,

    /// CHECK: transfer destination; only its address is used.
    pub recipient: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = spender,
        space = 8 + HolderBalance::INIT_SPACE,
        seeds = [BALANCE_SEED, config.key().as_ref(), recipient.key().as_ref()],
        bump
    )]
    pub recipient_balance: Account<'info, HolderBalance>,

    #[account(
        mut,
        seeds = [BALANCE_SEED, config.key().as_ref(), config.key().as_ref()],
        bump = vault_balance.bump
    )]
    pub vault_balance: Account<'info, HolderBalance>,

    #[account(
        mut,
        seeds = [BALANCE_SEED, config.key().as_ref(), BURN_ADDRESS.as_ref()],
        bump = burn_balance.bump
    )]
    pub burn_balance: Account<'info, HolderBalance>,

    pub system_program: Program<'info, System>,
}

pub fn transfer_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, TransferTokens<'info>>,
    amount: u128,
) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let token = accounts.config.key();
    let sender = accounts.sender.key();
    let recipient = accounts.recipient.key();
    accounts
        .recipient_balance
        .ensure_open(token, recipient, ctx.bumps.recipient_balance);

    let liquify = load_liquify_accounts(ctx.remaining_accounts, &accounts.config)?;
    let (mut pair_balance, venue) = match liquify {
        Some(LiquifyAccounts {
            pair_balance,
            venue,
        }) => (Some(pair_balance), Some(venue)),
        None => (None, None),
    };

    let mut balances = vec![
        &mut accounts.sender_balance,
        &mut accounts.recipient_balance,
        &mut accounts.vault_balance,
        &mut accounts.burn_balance,
    ];
    balances.extend(pair_balance.as_mut());

    super::run(&mut accounts.config, balances, Vec::new(), venue, |token| {
        token.transfer(sender, recipient, amount)
    })?;

    if let Some(pair_balance) = pair_balance {
        pair_balance.exit(&crate::ID)?;
    }
    Ok(())
}

pub fn transfer_from_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, TransferFrom<'info>>,
    amount: u128,
) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let token = accounts.config.key();
    let spender = accounts.spender.key();
    let owner = accounts.owner.key();
    let recipient = accounts.recipient.key();
    accounts
        .recipient_balance
        .ensure_open(token, recipient, ctx.bumps.recipient_balance);

    let liquify = load_liquify_accounts(ctx.remaining_accounts, &accounts.config)?;
    let (mut pair_balance, venue) = match liquify {
        Some(LiquifyAccounts {
            pair_balance,
            venue,
        }) => (Some(pair_balance), Some(venue)),
        None => (None, None),
    };

    let mut balances = vec![
        &mut accounts.owner_balance,
        &mut accounts.recipient_balance,
        &mut accounts.vault_balance,
        &mut accounts.burn_balance,
    ];
    balances.extend(pair_balance.as_mut());

    super::run(
        &mut accounts.config,
        balances,
        vec![&mut accounts.allowance],
        venue,
        |token| token.transfer_from(spender, owner, recipient, amount),
    )?;

    if let Some(pair_balance) = pair_balance {
        pair_balance.exit(&crate::ID)?;
    }
    Ok(())
}
