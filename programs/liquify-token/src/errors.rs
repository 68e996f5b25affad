use anchor_lang::prelude::*;

#[error_code]
pub enum TokenError {
    #[msg("Caller does not hold the required role")]
    Unauthorized,

    #[msg("Address must not be the zero address")]
    InvalidAddress,

    #[msg("Rate must not exceed the maximum rate")]
    RateTooHigh,

    #[msg("Transfer amount exceeds the maxTransferAmount")]
    TransferTooLarge,

    #[msg("Transfer amount exceeds balance")]
    InsufficientBalance,

    #[msg("Transfer amount exceeds allowance")]
    InsufficientAllowance,

    #[msg("Arithmetic overflow")]
    Overflow,

    #[msg("Anti-whale or fee exclusion list is full")]
    ExclusionListFull,

    #[msg("Balance account for this holder was not provided")]
    MissingBalanceAccount,

    #[msg("Balance or allowance account does not belong to this token")]
    InvalidBalanceAccount,

    #[msg("Liquidity venue router is not configured")]
    VenueNotConfigured,

    #[msg("Liquidity venue rejected the request")]
    VenueFailure,

    #[msg("Router accounts do not match the configured router and pair")]
    InvalidRouterAccounts,
}
