use anchor_lang::prelude::*;

pub mod access;
pub mod account_ledger;
pub mod anti_whale;
pub mod constants;
pub mod errors;
pub mod events;
pub mod fee;
pub mod instructions;
pub mod ledger;
pub mod liquidity;
pub mod router_cpi;
pub mod state;
pub mod token;

#[cfg(test)]
mod test_utils;

pub use instructions::admin::*;
pub use instructions::approve::*;
pub use instructions::initialize::*;
pub use instructions::mint::*;
pub use instructions::open_balance::*;
pub use instructions::transfer::*;

declare_id!("LiqTok1111111111111111111111111111111111111");

#[program]
pub mod liquify_token {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::handler(ctx)
    }

    pub fn open_balance(ctx: Context<OpenBalance>) -> Result<()> {
        instructions::open_balance::handler(ctx)
    }

    pub fn mint(ctx: Context<MintTokens>, amount: u128) -> Result<()> {
        instructions::mint::handler(ctx, amount)
    }

    pub fn transfer<'info>(
        ctx: Context<'_, '_, 'info, 'info, TransferTokens<'info>>,
        amount: u128,
    ) -> Result<()> {
        instructions::transfer::transfer_handler(ctx, amount)
    }

    pub fn transfer_from<'info>(
        ctx: Context<'_, '_, 'info, 'info, TransferFrom<'info>>,
        amount: u128,
    ) -> Result<()> {
        instructions::transfer::transfer_from_handler(ctx, amount)
    }

    pub fn approve(ctx: Context<Approve>, amount: u128) -> Result<()> {
        instructions::approve::handler(ctx, amount)
    }

    pub fn update_transfer_tax_rate(ctx: Context<UpdateConfig>, rate: u16) -> Result<()> {
        instructions::admin::update_transfer_tax_rate_handler(ctx, rate)
    }

    pub fn update_burn_rate(ctx: Context<UpdateConfig>, rate: u16) -> Result<()> {
        instructions::admin::update_burn_rate_handler(ctx, rate)
    }

    pub fn update_max_transfer_amount_rate(ctx: Context<UpdateConfig>, rate: u16) -> Result<()> {
        instructions::admin::update_max_transfer_amount_rate_handler(ctx, rate)
    }

    pub fn update_swap_and_liquify_enabled(
        ctx: Context<UpdateConfig>,
        enabled: bool,
    ) -> Result<()> {
        instructions::admin::update_swap_and_liquify_enabled_handler(ctx, enabled)
    }

    pub fn update_min_amount_to_liquify(ctx: Context<UpdateConfig>, amount: u128) -> Result<()> {
        instructions::admin::update_min_amount_to_liquify_handler(ctx, amount)
    }

    pub fn set_excluded_from_anti_whale(
        ctx: Context<UpdateConfig>,
        args: SetExclusionArgs,
    ) -> Result<()> {
        instructions::admin::set_excluded_from_anti_whale_handler(ctx, args)
    }

    pub fn set_excluded_from_fee(ctx: Context<UpdateConfig>, args: SetExclusionArgs) -> Result<()> {
        instructions::admin::set_excluded_from_fee_handler(ctx, args)
    }

    pub fn update_liquidity_venue_router(ctx: Context<UpdateLiquidityRouter>) -> Result<()> {
        instructions::admin::update_liquidity_venue_router_handler(ctx)
    }

    pub fn transfer_operator(ctx: Context<UpdateConfig>, new_operator: Pubkey) -> Result<()> {
        instructions::admin::transfer_operator_handler(ctx, new_operator)
    }
}
