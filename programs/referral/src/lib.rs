use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod registry;
pub mod state;

use events::{OperatorUpdated, ReferralCommissionRecorded, ReferralRecorded};
use state::{OperatorEntry, Referral, ReferralConfig, ReferrerStats};

declare_id!("Referra111111111111111111111111111111111111");

pub const CONFIG_SEED: &[u8] = b"config";
pub const OPERATOR_SEED: &[u8] = b"operator";
pub const REFERRAL_SEED: &[u8] = b"referral";
pub const REFERRER_SEED: &[u8] = b"referrer";

#[program]
pub mod referral {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        ctx.accounts.config.set_inner(ReferralConfig {
            owner: ctx.accounts.owner.key(),
            bump: ctx.bumps.config,
        });
        Ok(())
    }

    pub fn update_operator(ctx: Context<UpdateOperator>, status: bool) -> Result<()> {
        let config_key = ctx.accounts.config.key();
        registry::require_owner(&ctx.accounts.config, &ctx.accounts.owner.key())?;

        let operator = ctx.accounts.operator.key();
        let entry = &mut ctx.accounts.operator_entry;
        entry.config = config_key;
        entry.operator = operator;
        entry.is_active = status;
        entry.bump = ctx.bumps.operator_entry;

        emit!(OperatorUpdated {
            config: config_key,
            operator,
            status,
        });
        Ok(())
    }

    pub fn record_referral(ctx: Context<RecordReferral>) -> Result<()> {
        let accounts = &mut *ctx.accounts;
        registry::require_operator(&accounts.operator_entry, &accounts.operator.key())?;

        let config = accounts.config.key();
        let user = accounts.user.key();
        let referrer = accounts.referrer.key();

        let referral = &mut accounts.referral;
        if referral.config == Pubkey::default() {
            referral.config = config;
            referral.user = user;
            referral.bump = ctx.bumps.referral;
        }
        let stats = &mut accounts.referrer_stats;
        if stats.config == Pubkey::default() {
            stats.config = config;
            stats.referrer = referrer;
            stats.bump = ctx.bumps.referrer_stats;
        }

        if referral.assign(referrer) {
            stats.add_referral()?;
            emit!(ReferralRecorded {
                config,
                user,
                referrer,
            });
        }
        Ok(())
    }

    pub fn record_referral_commission(
        ctx: Context<RecordReferralCommission>,
        commission: u128,
    ) -> Result<()> {
        let accounts = &mut *ctx.accounts;
        registry::require_operator(&accounts.operator_entry, &accounts.operator.key())?;

        let config = accounts.config.key();
        let referrer = accounts.referrer.key();
        let stats = &mut accounts.referrer_stats;
        if stats.config == Pubkey::default() {
            stats.config = config;
            stats.referrer = referrer;
            stats.bump = ctx.bumps.referrer_stats;
        }

        if stats.add_commission(commission)? {
            emit!(ReferralCommissionRecorded {
                config,
                referrer,
                commission,
            });
        }
        Ok(())
    }
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        init,
        payer = owner,
        space = 8 + ReferralConfig::INIT_SPACE,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, ReferralConfig>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UpdateOperator<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, ReferralConfig>,

    /// CHECK: only the address is recorded.
    pub operator: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + OperatorEntry::INIT_SPACE,
        seeds = [OPERATOR_SEED, config.key().as_ref(), operator.key().as_ref()],
        bump
    )]
    pub operator_entry: Account<'info, OperatorEntry>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RecordReferral<'info> {
    #[account(mut)]
    pub operator: Signer<'info>,

    #[account(seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, ReferralConfig>,

    #[account(
        seeds = [OPERATOR_SEED, config.key().as_ref(), operator.key().as_ref()],
        bump = operator_entry.bump
    )]
    pub operator_entry: Account<'info, OperatorEntry>,

    /// CHECK: referred user; only the address is recorded.
    pub user: UncheckedAccount<'info>,

    /// CHECK: referrer; only the address is recorded.
    pub referrer: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = operator,
        space = 8 + Referral::INIT_SPACE,
        seeds = [REFERRAL_SEED, config.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub referral: Account<'info, Referral>,

    #[account(
        init_if_needed,
        payer = operator,
        space = 8 + ReferrerStats::INIT_SPACE,
        seeds = [REFERRER_SEED, config.key().as_ref(), referrer.key().as_ref()],
        bump
    )]
    pub referrer_stats: Account<'info, ReferrerStats>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RecordReferralCommission<'info> {
    #[account(mut)]
    pub operator: Signer<'info>,

    #[account(seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, ReferralConfig>,

    #[account(
        seeds = [OPERATOR_SEED, config.key().as_ref(), operator.key().as_ref()],
        bump = operator_entry.bump
    )]
    pub operator_entry: Account<'info, OperatorEntry>,

    /// CHECK: referrer; only the address is recorded.
    pub referrer: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = operator,
        space = 8 + ReferrerStats::INIT_SPACE,
        seeds = [REFERRER_SEED, config.key().as_ref(), referrer.key().as_ref()],
        bump
    )]
    pub referrer_stats: Account<'info, ReferrerStats>,

    pub system_program: Program<'info, System>,
}
