use anchor_lang::prelude::*;

use crate::constants::{BASIS_POINTS, MAX_BURN_RATE, MAX_TRANSFER_TAX_RATE, PERCENT};
use crate::errors::TokenError;
use crate::state::FeeConfig;

/// How one transfer's tax divides between the burn sink and the liquidity
/// accrual held by the token itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSplit {
    pub tax: u128,
    pub burn_part: u128,
    pub liquidity_part: u128,
}

impl FeeSplit {
    pub fn is_zero(&self) -> bool {
        self.tax == 0
    }
}

impl FeeConfig {
    pub fn set_transfer_tax_rate(&mut self, rate: u16) -> Result<u16> {
        require!(rate <= MAX_TRANSFER_TAX_RATE, TokenError::RateTooHigh);
        Ok(std::mem::replace(&mut self.transfer_tax_rate, rate))
    }

    pub fn set_burn_rate(&mut self, rate: u16) -> Result<u16> {
        require!(rate <= MAX_BURN_RATE, TokenError::RateTooHigh);
        Ok(std::mem::replace(&mut self.burn_rate, rate))
    }

    pub fn compute_fee(&self, amount: u128) -> Result<FeeSplit> {
        let tax = portion(amount, self.transfer_tax_rate, BASIS_POINTS)?;
        let burn_part = portion(tax, self.burn_rate, PERCENT)?;
        let liquidity_part = tax.checked_sub(burn_part).ok_or(TokenError::Overflow)?;

        Ok(FeeSplit {
            tax,
            burn_part,
            liquidity_part,
        })
    }
}

/// `floor(amount * rate / denominator)` without forming the full product, so
/// any amount is accepted while `rate <= denominator`.
pub(crate) fn portion(amount: u128, rate: u16, denominator: u128) -> Result<u128> {
    let rate = u128::from(rate);
    let whole = (amount / denominator)
        .checked_mul(rate)
        .ok_or(TokenError::Overflow)?;
    let remainder = (amount % denominator)
        .checked_mul(rate)
        .ok_or(TokenError::Overflow)?
        / denominator;
    Ok(whole.checked_add(remainder).ok_or(TokenError::Overflow)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_token_error;

    fn fees(transfer_tax_rate: u16, burn_rate: u16) -> FeeConfig {
        FeeConfig {
            transfer_tax_rate,
            burn_rate,
        }
    }

    #[test]
    fn defaults_tax_and_burn() {
        let config = FeeConfig::default();
        assert_eq!(config.transfer_tax_rate, 500);
        assert_eq!(config.burn_rate, 20);
    }

    #[test]
    fn splits_reference_transfer() {
        let split = fees(500, 20).compute_fee(12_345).unwrap();
        assert_eq!(
            split,
            FeeSplit {
                tax: 617,
                burn_part: 123,
                liquidity_part: 494,
            }
        );
    }

    #[test]
    fn small_amounts_floor_to_zero() {
        assert!(fees(500, 20).compute_fee(19).unwrap().is_zero());
        assert_eq!(fees(500, 20).compute_fee(20).unwrap().tax, 1);
    }

    #[test]
    fn zero_rate_charges_nothing() {
        assert_eq!(fees(0, 20).compute_fee(10_000).unwrap(), FeeSplit::default());
    }

    #[test]
    fn burn_rate_extremes() {
        let none_burned = fees(500, 0).compute_fee(1_234).unwrap();
        assert_eq!((none_burned.tax, none_burned.burn_part), (61, 0));
        assert_eq!(none_burned.liquidity_part, 61);

        let all_burned = fees(500, 100).compute_fee(1_234).unwrap();
        assert_eq!((all_burned.burn_part, all_burned.liquidity_part), (61, 0));
    }

    #[test]
    fn largest_amounts_are_taxed_exactly() {
        let split = fees(1_000, 100).compute_fee(u128::MAX).unwrap();
        assert_eq!(split.tax, u128::MAX / 10);
        assert_eq!(split.burn_part, split.tax);
        assert_eq!(split.liquidity_part, 0);

        let half = u128::MAX / 200;
        let split = fees(500, 20).compute_fee(half).unwrap();
        assert_eq!(split.tax, half / 10_000 * 500 + half % 10_000 * 500 / 10_000);
        assert_eq!(split.burn_part + split.liquidity_part, split.tax);
    }

    #[test]
    fn portion_matches_wide_product_floor() {
        for amount in [0u128, 1, 19, 9_999, 10_000, 12_345, 1 << 100] {
            for rate in [0u16, 1, 50, 500, 1_000, 10_000] {
                assert_eq!(
                    portion(amount, rate, BASIS_POINTS).unwrap(),
                    amount * u128::from(rate) / BASIS_POINTS
                );
            }
        }
        assert_eq!(portion(u128::MAX, 10_000, BASIS_POINTS).unwrap(), u128::MAX);
    }

    #[test]
    fn rate_setters_enforce_ceilings() {
        let mut config = FeeConfig::default();

        assert_eq!(config.set_transfer_tax_rate(0).unwrap(), 500);
        assert_eq!(config.set_transfer_tax_rate(1_000).unwrap(), 0);
        assert_token_error(config.set_transfer_tax_rate(1_001), TokenError::RateTooHigh);
        assert_eq!(config.transfer_tax_rate, 1_000);

        assert_eq!(config.set_burn_rate(0).unwrap(), 20);
        assert_eq!(config.set_burn_rate(100).unwrap(), 0);
        assert_token_error(config.set_burn_rate(101), TokenError::RateTooHigh);
        assert_eq!(config.burn_rate, 100);
    }
}
