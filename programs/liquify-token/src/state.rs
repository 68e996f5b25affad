use anchor_lang::prelude::*;

use crate::constants::{
    BURN_ADDRESS, DEFAULT_BURN_RATE, DEFAULT_MAX_TRANSFER_AMOUNT_RATE,
    DEFAULT_MIN_AMOUNT_TO_LIQUIFY, DEFAULT_TRANSFER_TAX_RATE, MAX_EXCLUDED_FROM_ANTI_WHALE,
    MAX_EXCLUDED_FROM_FEE,
};

#[account]
pub struct TokenConfig {
    pub identity: Pubkey,
    pub owner: Pubkey,
    pub operator: Pubkey,
    pub total_supply: u128,
    pub fees: FeeConfig,
    pub anti_whale: AntiWhaleConfig,
    pub liquidity: LiquidityConfig,
    pub fee_exempt: Vec<Pubkey>,
    pub bump: u8,
}

impl TokenConfig {
    pub const INIT_SPACE: usize = 32 * 3
        + 16
        + FeeConfig::SPACE
        + AntiWhaleConfig::SPACE
        + LiquidityConfig::SPACE
        + (4 + 32 * MAX_EXCLUDED_FROM_FEE)
        + 1;

    /// Fresh configuration for a token whose own address is `token`.
    /// The creator is both owner and operator.
    pub fn new(identity: Pubkey, owner: Pubkey, token: Pubkey, bump: u8) -> Self {
        Self {
            identity,
            owner,
            operator: owner,
            total_supply: 0,
            fees: FeeConfig::default(),
            anti_whale: AntiWhaleConfig {
                max_transfer_amount_rate: DEFAULT_MAX_TRANSFER_AMOUNT_RATE,
                excluded: vec![owner, Pubkey::default(), token, BURN_ADDRESS],
            },
            liquidity: LiquidityConfig::default(),
            fee_exempt: Vec::new(),
            bump,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeConfig {
    /// Basis points of every taxed transfer.
    pub transfer_tax_rate: u16,
    /// Percent of the tax that is burned; the rest accrues for liquidity.
    pub burn_rate: u16,
}

impl FeeConfig {
    pub const SPACE: usize = 2 + 2;
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            transfer_tax_rate: DEFAULT_TRANSFER_TAX_RATE,
            burn_rate: DEFAULT_BURN_RATE,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AntiWhaleConfig {
    pub max_transfer_amount_rate: u16,
    pub excluded: Vec<Pubkey>,
}

impl AntiWhaleConfig {
    pub const SPACE: usize = 2 + 4 + 32 * MAX_EXCLUDED_FROM_ANTI_WHALE;
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct LiquidityConfig {
    pub swap_and_liquify_enabled: bool,
    pub min_amount_to_liquify: u128,
    pub router: Option<Pubkey>,
    pub pair: Option<Pubkey>,
}

impl LiquidityConfig {
    pub const SPACE: usize = 1 + 16 + 33 + 33;
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            swap_and_liquify_enabled: false,
            min_amount_to_liquify: DEFAULT_MIN_AMOUNT_TO_LIQUIFY,
            router: None,
            pair: None,
        }
    }
}

#[account]
pub struct HolderBalance {
    pub config: Pubkey,
    pub holder: Pubkey,
    pub amount: u128,
    pub bump: u8,
}

impl HolderBalance {
    pub const INIT_SPACE: usize = 32 + 32 + 16 + 1;
}

#[account]
pub struct Allowance {
    pub config: Pubkey,
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub amount: u128,
    pub bump: u8,
}

impl Allowance {
    pub const INIT_SPACE: usize = 32 * 3 + 16 + 1;
}
