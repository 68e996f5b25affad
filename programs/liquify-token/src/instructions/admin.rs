use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::errors::TokenError;
use crate::router_cpi::RouterCpi;
use crate::state::TokenConfig;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct SetExclusionArgs {
    pub account: Pubkey,
    pub excluded: bool,
}

/// Shared by every operator-only configuration update.
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    pub operator: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED, config.identity.as_ref()], bump = config.bump)]
    pub config: Box<Account<'info, TokenConfig>>,
}

#[derive(Accounts)]
pub struct UpdateLiquidityRouter<'info> {
    pub operator: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED, config.identity.as_ref()], bump = config.bump)]
    pub config: Box<Account<'info, TokenConfig>>,

    /// CHECK: must be an executable program; the pool pair is derived from it.
    pub router: UncheckedAccount<'info>,

    /// CHECK: base currency mint the pool trades against; only its address is used.
    pub base_mint: UncheckedAccount<'info>,
}

fn update(
    ctx: Context<UpdateConfig>,
    op: impl FnOnce(&mut super::OnChainToken<'_, '_>, Pubkey) -> Result<()>,
) -> Result<()> {
    let operator = ctx.accounts.operator.key();
    super::run(
        &mut ctx.accounts.config,
        Vec::new(),
        Vec::new(),
        None,
        |token| op(token, operator),
    )
}

pub fn update_transfer_tax_rate_handler(ctx: Context<UpdateConfig>, rate: u16) -> Result<()> {
    update(ctx, |token, operator| {
        token.update_transfer_tax_rate(operator, rate)
    })
}

pub fn update_burn_rate_handler(ctx: Context<UpdateConfig>, rate: u16) -> Result<()> {
    update(ctx, |token, operator| token.update_burn_rate(operator, rate))
}

pub fn update_max_transfer_amount_rate_handler(
    ctx: Context<UpdateConfig>,
    rate: u16,
) -> Result<()> {
    update(ctx, |token, operator| {
        token.update_max_transfer_amount_rate(operator, rate)
    })
}

pub fn update_swap_and_liquify_enabled_handler(
    ctx: Context<UpdateConfig>,
    enabled: bool,
) -> Result<()> {
    update(ctx, |token, operator| {
        token.update_swap_and_liquify_enabled(operator, enabled)
    })
}

pub fn update_min_amount_to_liquify_handler(
    ctx: Context<UpdateConfig>,
    amount: u128,
) -> Result<()> {
    update(ctx, |token, operator| {
        token.update_min_amount_to_liquify(operator, amount)
    })
}

pub fn set_excluded_from_anti_whale_handler(
    ctx: Context<UpdateConfig>,
    args: SetExclusionArgs,
) -> Result<()> {
    update(ctx, |token, operator| {
        token.set_excluded_from_anti_whale(operator, args.account, args.excluded)
    })
}

pub fn set_excluded_from_fee_handler(
    ctx: Context<UpdateConfig>,
    args: SetExclusionArgs,
) -> Result<()> {
    update(ctx, |token, operator| {
        token.set_excluded_from_fee(operator, args.account, args.excluded)
    })
}

pub fn transfer_operator_handler(ctx: Context<UpdateConfig>, new_operator: Pubkey) -> Result<()> {
    update(ctx, |token, operator| {
        token.transfer_operator(operator, new_operator)
    })
}

pub fn update_liquidity_venue_router_handler(ctx: Context<UpdateLiquidityRouter>) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    require!(
        accounts.router.executable,
        TokenError::InvalidRouterAccounts
    );
    let operator = accounts.operator.key();
    let venue = RouterCpi::describe(accounts.router.key(), accounts.base_mint.key());

    super::run(&mut accounts.config, Vec::new(), Vec::new(), None, |token| {
        token.update_liquidity_venue_router(operator, venue)
    })
}
