use anchor_lang::prelude::*;

use crate::constants::{BALANCE_SEED, BURN_ADDRESS, CONFIG_SEED};
use crate::events::TokenInitialized;
use crate::state::{HolderBalance, TokenConfig};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Fresh keypair that names this token instance.
    pub identity: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = 8 + TokenConfig::INIT_SPACE,
        seeds = [CONFIG_SEED, identity.key().as_ref()],
        bump
    )]
    pub config: Box<Account<'info, TokenConfig>>,

    #[account(
        init,
        payer = authority,
        space = 8 + HolderBalance::INIT_SPACE,
        seeds = [BALANCE_SEED, config.key().as_ref(), config.key().as_ref()],
        bump
    )]
    pub vault_balance: Account<'info, HolderBalance>,

    #[account(
        init,
        payer = authority,
        space = 8 + HolderBalance::INIT_SPACE,
        seeds = [BALANCE_SEED, config.key().as_ref(), BURN_ADDRESS.as_ref()],
        bump
    )]
    pub burn_balance: Account<'info, HolderBalance>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let token = accounts.config.key();
    let identity = accounts.identity.key();
    let owner = accounts.authority.key();

    accounts
        .config
        .set_inner(TokenConfig::new(identity, owner, token, ctx.bumps.config));
    accounts
        .vault_balance
        .ensure_open(token, token, ctx.bumps.vault_balance);
    accounts
        .burn_balance
        .ensure_open(token, BURN_ADDRESS, ctx.bumps.burn_balance);

    msg!("liquify token {} initialized, owner {}", token, owner);
    emit!(TokenInitialized {
        token,
        identity,
        owner,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
