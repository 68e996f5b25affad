use anchor_lang::prelude::*;

use crate::errors::TokenError;
use crate::state::TokenConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Owner,
    Operator,
}

impl Role {
    pub fn holder(self, config: &TokenConfig) -> Pubkey {
        match self {
            Role::Owner => config.owner,
            Role::Operator => config.operator,
        }
    }
}

pub fn authorize(config: &TokenConfig, caller: &Pubkey, role: Role) -> Result<()> {
    require_keys_eq!(role.holder(config), *caller, TokenError::Unauthorized);
    Ok(())
}

/// Hands the operator role to `new_operator`. Returns the previous operator.
pub fn transfer_operator(
    config: &mut TokenConfig,
    caller: &Pubkey,
    new_operator: Pubkey,
) -> Result<Pubkey> {
    authorize(config, caller, Role::Operator)?;
    require_keys_neq!(new_operator, Pubkey::default(), TokenError::InvalidAddress);

    let previous = config.operator;
    config.operator = new_operator;
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_token_error;

    fn config() -> TokenConfig {
        TokenConfig::new(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique(), 255)
    }

    #[test]
    fn operator_starts_as_owner() {
        let config = config();
        assert_eq!(config.operator, config.owner);
        assert!(authorize(&config, &config.owner, Role::Operator).is_ok());
    }

    #[test]
    fn rejects_strangers() {
        let config = config();
        let stranger = Pubkey::new_unique();
        assert_token_error(authorize(&config, &stranger, Role::Owner), TokenError::Unauthorized);
        assert_token_error(
            authorize(&config, &stranger, Role::Operator),
            TokenError::Unauthorized,
        );
    }

    #[test]
    fn only_current_operator_transfers_the_role() {
        let mut config = config();
        let owner = config.owner;
        let operator = Pubkey::new_unique();

        assert_token_error(
            transfer_operator(&mut config, &operator, operator),
            TokenError::Unauthorized,
        );

        let previous = transfer_operator(&mut config, &owner, operator).unwrap();
        assert_eq!(previous, owner);
        assert_eq!(config.operator, operator);
        assert_eq!(config.owner, owner);

        // the owner lost the operator role with the transfer
        assert_token_error(
            transfer_operator(&mut config, &owner, owner),
            TokenError::Unauthorized,
        );
    }

    #[test]
    fn rejects_zero_operator() {
        let mut config = config();
        let owner = config.owner;
        assert_token_error(
            transfer_operator(&mut config, &owner, Pubkey::default()),
            TokenError::InvalidAddress,
        );
        assert_eq!(config.operator, owner);
    }
}
