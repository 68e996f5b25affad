use anchor_lang::prelude::*;

use crate::constants::{
    BASIS_POINTS, BURN_ADDRESS, MAX_EXCLUDED_FROM_ANTI_WHALE, MAX_TRANSFER_AMOUNT_RATE_CEILING,
};
use crate::errors::TokenError;
use crate::fee::portion;
use crate::state::{AntiWhaleConfig, TokenConfig};

/// Recipients that bypass the transfer cap regardless of the exclusion list,
/// so treasury, burn and fee-collection flows are never capped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExemptRecipient {
    TokenSelf,
    Owner,
    Operator,
    BurnSink,
}

pub const EXEMPT_RECIPIENTS: [ExemptRecipient; 4] = [
    ExemptRecipient::TokenSelf,
    ExemptRecipient::Owner,
    ExemptRecipient::Operator,
    ExemptRecipient::BurnSink,
];

impl ExemptRecipient {
    pub fn address(self, token: &Pubkey, config: &TokenConfig) -> Pubkey {
        match self {
            ExemptRecipient::TokenSelf => *token,
            ExemptRecipient::Owner => config.owner,
            ExemptRecipient::Operator => config.operator,
            ExemptRecipient::BurnSink => BURN_ADDRESS,
        }
    }
}

pub fn max_transfer_amount(total_supply: u128, rate: u16) -> Result<u128> {
    portion(total_supply, rate, BASIS_POINTS)
}

pub fn is_exempt(token: &Pubkey, config: &TokenConfig, sender: &Pubkey, recipient: &Pubkey) -> bool {
    config.anti_whale.is_excluded(sender)
        || config.anti_whale.is_excluded(recipient)
        || EXEMPT_RECIPIENTS
            .iter()
            .any(|role| role.address(token, config) == *recipient)
}

/// Cap value meaning "no limit": there is no supply yet, or the operator set
/// the rate to zero.
pub const UNLIMITED_CAP: u128 = 0;

/// Rejects a non-exempt transfer above `cap`. A cap of [`UNLIMITED_CAP`]
/// leaves transfers unrestricted.
pub fn check_transfer(amount: u128, cap: u128, exempt: bool) -> Result<()> {
    if cap != UNLIMITED_CAP && !exempt {
        require!(amount <= cap, TokenError::TransferTooLarge);
    }
    Ok(())
}

impl AntiWhaleConfig {
    pub fn is_excluded(&self, account: &Pubkey) -> bool {
        self.excluded.contains(account)
    }

    pub fn set_max_transfer_amount_rate(&mut self, rate: u16) -> Result<u16> {
        require!(
            rate <= MAX_TRANSFER_AMOUNT_RATE_CEILING,
            TokenError::RateTooHigh
        );
        Ok(std::mem::replace(&mut self.max_transfer_amount_rate, rate))
    }

    pub fn set_excluded(&mut self, account: Pubkey, excluded: bool) -> Result<()> {
        set_membership(
            &mut self.excluded,
            account,
            excluded,
            MAX_EXCLUDED_FROM_ANTI_WHALE,
        )
    }
}

/// Shared by the anti-whale and fee exemption lists.
pub(crate) fn set_membership(
    list: &mut Vec<Pubkey>,
    account: Pubkey,
    member: bool,
    capacity: usize,
) -> Result<()> {
    let position = list.iter().position(|entry| *entry == account);
    match (member, position) {
        (true, None) => {
            require!(list.len() < capacity, TokenError::ExclusionListFull);
            list.push(account);
        }
        (false, Some(index)) => {
            list.swap_remove(index);
        }
        _ => {}
    }
    Ok(())
}
