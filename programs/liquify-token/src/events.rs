use anchor_lang::prelude::*;

#[event]
pub struct TokenInitialized {
    pub token: Pubkey,
    pub identity: Pubkey,
    pub owner: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct Transfer {
    pub token: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u128,
}

#[event]
pub struct Approval {
    pub token: Pubkey,
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub amount: u128,
}

#[event]
pub struct TransferTaxed {
    pub token: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u128,
    pub tax: u128,
    pub burned: u128,
    pub to_liquidity: u128,
}

#[event]
pub struct TokensMinted {
    pub token: Pubkey,
    pub recipient: Pubkey,
    pub amount: u128,
    pub new_total_supply: u128,
}

#[event]
pub struct TransferTaxRateUpdated {
    pub token: Pubkey,
    pub operator: Pubkey,
    pub previous_rate: u16,
    pub new_rate: u16,
    pub timestamp: i64,
}

#[event]
pub struct BurnRateUpdated {
    pub token: Pubkey,
    pub operator: Pubkey,
    pub previous_rate: u16,
    pub new_rate: u16,
    pub timestamp: i64,
}

#[event]
pub struct MaxTransferAmountRateUpdated {
    pub token: Pubkey,
    pub operator: Pubkey,
    pub previous_rate: u16,
    pub new_rate: u16,
    pub timestamp: i64,
}

#[event]
pub struct SwapAndLiquifyEnabledUpdated {
    pub token: Pubkey,
    pub operator: Pubkey,
    pub enabled: bool,
    pub timestamp: i64,
}

#[event]
pub struct MinAmountToLiquifyUpdated {
    pub token: Pubkey,
    pub operator: Pubkey,
    pub previous_amount: u128,
    pub new_amount: u128,
    pub timestamp: i64,
}

#[event]
pub struct AntiWhaleExclusionUpdated {
    pub token: Pubkey,
    pub account: Pubkey,
    pub excluded: bool,
    pub timestamp: i64,
}

#[event]
pub struct FeeExclusionUpdated {
    pub token: Pubkey,
    pub account: Pubkey,
    pub excluded: bool,
    pub timestamp: i64,
}

#[event]
pub struct LiquidityRouterUpdated {
    pub token: Pubkey,
    pub operator: Pubkey,
    pub router: Pubkey,
    pub pair: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct OperatorTransferred {
    pub token: Pubkey,
    pub previous_operator: Pubkey,
    pub new_operator: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct SwapAndLiquify {
    pub token: Pubkey,
    pub tokens_swapped: u128,
    pub base_received: u128,
    pub tokens_into_liquidity: u128,
    pub lp_minted: u128,
}

#[event]
pub struct LiquifyFailed {
    pub token: Pubkey,
    pub attempted_amount: u128,
}
