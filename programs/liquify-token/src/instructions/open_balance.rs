use anchor_lang::prelude::*;

use crate::constants::{BALANCE_SEED, CONFIG_SEED};
use crate::state::{HolderBalance, TokenConfig};

#[derive(Accounts)]
pub struct OpenBalance<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(seeds = [CONFIG_SEED, config.identity.as_ref()], bump = config.bump)]
    pub config: Box<Account<'info, TokenConfig>>,

    /// CHECK: any address may hold tokens, including program-derived ones.
    pub holder: UncheckedAccount<'info>,

    #[account(
        init,
        payer = payer,
        space = 8 + HolderBalance::INIT_SPACE,
        seeds = [BALANCE_SEED, config.key().as_ref(), holder.key().as_ref()],
        bump
    )]
    pub balance: Account<'info, HolderBalance>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<OpenBalance>) -> Result<()> {
    let config = ctx.accounts.config.key();
    let holder = ctx.accounts.holder.key();
    ctx.accounts
        .balance
        .ensure_open(config, holder, ctx.bumps.balance);
    Ok(())
}
