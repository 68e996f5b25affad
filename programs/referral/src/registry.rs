use anchor_lang::prelude::*;

use crate::errors::ReferralError;
use crate::state::{OperatorEntry, Referral, ReferralConfig, ReferrerStats};

pub fn require_owner(config: &ReferralConfig, caller: &Pubkey) -> Result<()> {
    require_keys_eq!(config.owner, *caller, ReferralError::Unauthorized);
    Ok(())
}

pub fn require_operator(entry: &OperatorEntry, caller: &Pubkey) -> Result<()> {
    require!(
        entry.is_active && entry.operator == *caller,
        ReferralError::Unauthorized
    );
    Ok(())
}

/// Null parties and self-referrals are silently ignored.
pub fn is_valid_referral(user: &Pubkey, referrer: &Pubkey) -> bool {
    *user != Pubkey::default() && *referrer != Pubkey::default() && user != referrer
}

impl Referral {
    /// Records `referrer` for this user unless one is already set.
    /// Returns whether anything changed.
    pub fn assign(&mut self, referrer: Pubkey) -> bool {
        if self.referrer != Pubkey::default() || !is_valid_referral(&self.user, &referrer) {
            return false;
        }
        self.referrer = referrer;
        true
    }
}

impl ReferrerStats {
    pub fn add_referral(&mut self) -> Result<()> {
        self.referrals_count = self
            .referrals_count
            .checked_add(1)
            .ok_or(ReferralError::Overflow)?;
        Ok(())
    }

    /// Returns whether the commission was counted; zero amounts and the null
    /// referrer are ignored.
    pub fn add_commission(&mut self, amount: u128) -> Result<bool> {
        if amount == 0 || self.referrer == Pubkey::default() {
            return Ok(false);
        }
        self.total_commissions = self
            .total_commissions
            .checked_add(amount)
            .ok_or(ReferralError::Overflow)?;
        Ok(true)
    }
}
