use anchor_lang::prelude::Result;
use anchor_lang::solana_program::program_error::ProgramError;

use crate::errors::TokenError;

pub fn assert_token_error<T>(result: Result<T>, expected: TokenError) {
    match result {
        Ok(_) => panic!("expected error: {}", expected),
        Err(err) => assert_eq!(
            ProgramError::from(err),
            ProgramError::Custom(u32::from(expected)),
            "expected error: {}",
            expected
        ),
    }
}
