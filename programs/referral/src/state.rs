use anchor_lang::prelude::*;

#[account]
pub struct ReferralConfig {
    pub owner: Pubkey,
    pub bump: u8,
}

impl ReferralConfig {
    pub const INIT_SPACE: usize = 32 + 1;
}

/// Whether `operator` may record referrals and commissions.
#[account]
pub struct OperatorEntry {
    pub config: Pubkey,
    pub operator: Pubkey,
    pub is_active: bool,
    pub bump: u8,
}

impl OperatorEntry {
    pub const INIT_SPACE: usize = 32 + 32 + 1 + 1;
}

/// Who referred `user`. A default `referrer` means none recorded yet.
#[account]
pub struct Referral {
    pub config: Pubkey,
    pub user: Pubkey,
    pub referrer: Pubkey,
    pub bump: u8,
}

impl Referral {
    pub const INIT_SPACE: usize = 32 * 3 + 1;
}

#[account]
pub struct ReferrerStats {
    pub config: Pubkey,
    pub referrer: Pubkey,
    pub referrals_count: u64,
    pub total_commissions: u128,
    pub bump: u8,
}

impl ReferrerStats {
    pub const INIT_SPACE: usize = 32 + 32 + 8 + 16 + 1;
}
