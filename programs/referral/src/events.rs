use anchor_lang::prelude::*;

#[event]
pub struct OperatorUpdated {
    pub config: Pubkey,
    pub operator: Pubkey,
    pub status: bool,
}

#[event]
pub struct ReferralRecorded {
    pub config: Pubkey,
    pub user: Pubkey,
    pub referrer: Pubkey,
}

#[event]
pub struct ReferralCommissionRecorded {
    pub config: Pubkey,
    pub referrer: Pubkey,
    pub commission: u128,
}
