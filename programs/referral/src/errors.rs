use anchor_lang::prelude::*;

#[error_code]
pub enum ReferralError {
    #[msg("Caller is not the owner or an active operator")]
    Unauthorized,

    #[msg("Arithmetic overflow")]
    Overflow,
}
