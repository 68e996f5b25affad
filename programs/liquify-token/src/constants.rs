use anchor_lang::prelude::Pubkey;

pub const CONFIG_SEED: &[u8] = b"token";
pub const BALANCE_SEED: &[u8] = b"balance";
pub const ALLOWANCE_SEED: &[u8] = b"allowance";

/// Unspendable holder that receives the burn share of every taxed transfer
/// (`BurnSink11111111111111111111111111111111111`).
pub const BURN_ADDRESS: Pubkey = Pubkey::new_from_array([
    2, 203, 147, 64, 115, 114, 193, 82, 43, 70, 1, 211, 142, 80, 206, 130, 198, 134, 222, 217,
    107, 168, 91, 131, 86, 12, 128, 232, 0, 0, 0, 0,
]);

pub const DECIMALS: u8 = 18;

pub const BASIS_POINTS: u128 = 10_000;
pub const PERCENT: u128 = 100;

pub const MAX_TRANSFER_TAX_RATE: u16 = 1_000;
pub const MAX_BURN_RATE: u16 = 100;
pub const MAX_TRANSFER_AMOUNT_RATE_CEILING: u16 = 10_000;

pub const DEFAULT_TRANSFER_TAX_RATE: u16 = 500;
pub const DEFAULT_BURN_RATE: u16 = 20;
pub const DEFAULT_MAX_TRANSFER_AMOUNT_RATE: u16 = 50;
pub const DEFAULT_MIN_AMOUNT_TO_LIQUIFY: u128 = 500 * 10u128.pow(DECIMALS as u32);

pub const MAX_EXCLUDED_FROM_ANTI_WHALE: usize = 16;
pub const MAX_EXCLUDED_FROM_FEE: usize = 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burn_address_matches_its_base58_name() {
        assert_eq!(
            BURN_ADDRESS.to_string(),
            "BurnSink11111111111111111111111111111111111"
        );
        assert_ne!(BURN_ADDRESS, Pubkey::default());
    }
}
