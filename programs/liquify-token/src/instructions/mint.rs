use anchor_lang::prelude::*;

use crate::constants::{BALANCE_SEED, CONFIG_SEED};
use crate::state::{HolderBalance, TokenConfig};

#[derive(Accounts)]
pub struct MintTokens<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED, config.identity.as_ref()], bump = config.bump)]
    pub config: Box<Account<'info, TokenConfig>>,

    /// CHECK: mint destination; only its address is used.
    pub recipient: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + HolderBalance::INIT_SPACE,
        seeds = [BALANCE_SEED, config.key().as_ref(), recipient.key().as_ref()],
        bump
    )]
    pub recipient_balance: Account<'info, HolderBalance>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<MintTokens>, amount: u128) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let token = accounts.config.key();
    let owner = accounts.owner.key();
    let recipient = accounts.recipient.key();
    accounts
        .recipient_balance
        .ensure_open(token, recipient, ctx.bumps.recipient_balance);

    super::run(
        &mut accounts.config,
        vec![&mut accounts.recipient_balance],
        Vec::new(),
        None,
        |token| token.mint(owner, recipient, amount),
    )
}
