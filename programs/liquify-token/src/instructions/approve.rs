use anchor_lang::prelude::*;

use crate::constants::{ALLOWANCE_SEED, CONFIG_SEED};
use crate::state::{Allowance, TokenConfig};

#[derive(Accounts)]
pub struct Approve<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED, config.identity.as_ref()], bump = config.bump)]
    pub config: Box<Account<'info, TokenConfig>>,

    /// CHECK: the spender is only recorded.
    pub spender: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + Allowance::INIT_SPACE,
        seeds = [
            ALLOWANCE_SEED,
            config.key().as_ref(),
            owner.key().as_ref(),
            spender.key().as_ref()
        ],
        bump
    )]
    pub allowance: Account<'info, Allowance>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Approve>, amount: u128) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let token = accounts.config.key();
    let owner = accounts.owner.key();
    let spender = accounts.spender.key();
    accounts
        .allowance
        .ensure_open(token, owner, spender, ctx.bumps.allowance);

    super::run(
        &mut accounts.config,
        Vec::new(),
        vec![&mut accounts.allowance],
        None,
        |token| token.approve(owner, spender, amount),
    )
}
