use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hash;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::{get_return_data, invoke_signed};

use crate::constants::CONFIG_SEED;
use crate::errors::TokenError;
use crate::liquidity::{LiquidityReceipt, LiquidityVenue, VenueHost};

pub const PAIR_SEED: &[u8] = b"pair";

const SWAP_IX: &str = "swap_exact_tokens_for_base";
const ADD_LIQUIDITY_IX: &str = "add_liquidity";

#[derive(AnchorSerialize)]
struct SwapArgs {
    amount_in: u128,
    path: Vec<Pubkey>,
}

#[derive(AnchorSerialize)]
struct AddLiquidityArgs {
    token_amount: u128,
    base_amount: u128,
    recipient: Pubkey,
}

#[derive(AnchorDeserialize)]
struct ReceiptData {
    token_used: u128,
    base_used: u128,
    lp_minted: u128,
}

/// Signer seeds of the token config PDA, which authorizes router calls.
pub struct TokenSigner {
    pub identity: Pubkey,
    pub bump: u8,
}

struct Invocation<'info> {
    program: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    accounts: Vec<AccountInfo<'info>>,
    signer: TokenSigner,
}

/// Liquidity venue backed by an external router program.
///
/// Token legs never leave this program: the router is credited through the
/// token's own ledger (`transfer_from` against the approval the cycle
/// grants it) and only the base-currency side is settled by CPI.
pub struct RouterCpi<'info> {
    router: Pubkey,
    base_mint: Pubkey,
    invocation: Option<Invocation<'info>>,
}

impl<'info> RouterCpi<'info> {
    /// Addresses only; enough to record the venue, not to trade on it.
    pub fn describe(router: Pubkey, base_mint: Pubkey) -> Self {
        Self {
            router,
            base_mint,
            invocation: None,
        }
    }

    /// Builds a tradable venue from the trailing accounts of a transfer:
    /// `[router_program, pair_balance, base_mint, ..router accounts]`.
    /// The pair balance is consumed by the ledger, so only the router
    /// program and its own accounts are kept here.
    pub fn from_remaining_accounts(
        remaining: &[AccountInfo<'info>],
        authority: AccountInfo<'info>,
        signer: TokenSigner,
    ) -> Result<Self> {
        let [program, _pair_balance, base_mint, accounts @ ..] = remaining else {
            return err!(TokenError::InvalidRouterAccounts);
        };
        require!(program.executable, TokenError::InvalidRouterAccounts);

        Ok(Self {
            router: program.key(),
            base_mint: base_mint.key(),
            invocation: Some(Invocation {
                program: program.clone(),
                authority,
                accounts: accounts.to_vec(),
                signer,
            }),
        })
    }

    pub fn pair_address(router: &Pubkey, token: &Pubkey, base_mint: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(&[PAIR_SEED, token.as_ref(), base_mint.as_ref()], router).0
    }

    fn pair(&self, token: &Pubkey) -> Pubkey {
        Self::pair_address(&self.router, token, &self.base_mint)
    }

    fn call<A: AnchorSerialize>(&self, name: &str, args: &A) -> Result<Vec<u8>> {
        let invocation = self
            .invocation
            .as_ref()
            .ok_or(TokenError::VenueNotConfigured)?;

        let mut data = anchor_discriminator(name).to_vec();
        args.serialize(&mut data)
            .map_err(|_| error!(TokenError::VenueFailure))?;

        let mut metas = vec![AccountMeta::new_readonly(invocation.authority.key(), true)];
        metas.extend(invocation.accounts.iter().map(|info| AccountMeta {
            pubkey: info.key(),
            is_signer: info.is_signer,
            is_writable: info.is_writable,
        }));
        let ix = Instruction {
            program_id: self.router,
            accounts: metas,
            data,
        };

        let mut infos = Vec::with_capacity(invocation.accounts.len() + 2);
        infos.push(invocation.authority.clone());
        infos.extend(invocation.accounts.iter().cloned());
        infos.push(invocation.program.clone());

        let bump = [invocation.signer.bump];
        let seeds: &[&[u8]] = &[CONFIG_SEED, invocation.signer.identity.as_ref(), &bump];
        invoke_signed(&ix, &infos, &[seeds])?;

        match get_return_data() {
            Some((program_id, data)) if program_id == self.router => Ok(data),
            _ => err!(TokenError::VenueFailure),
        }
    }
}

impl LiquidityVenue for RouterCpi<'_> {
    fn router(&self) -> Pubkey {
        self.router
    }

    fn base_currency(&self) -> Pubkey {
        self.base_mint
    }

    fn pair_for(&mut self, token: &Pubkey) -> Result<Pubkey> {
        Ok(self.pair(token))
    }

    fn swap_exact_tokens_for_base(
        &mut self,
        host: &mut dyn VenueHost,
        amount_in: u128,
        path: &[Pubkey],
    ) -> Result<u128> {
        let token = host.token_address();
        require!(
            path.first() == Some(&token) && path.last() == Some(&self.base_mint),
            TokenError::InvalidRouterAccounts
        );
        let pair = self.pair(&token);
        host.transfer_from(self.router, token, pair, amount_in)?;

        let data = self.call(
            SWAP_IX,
            &SwapArgs {
                amount_in,
                path: path.to_vec(),
            },
        )?;
        u128::try_from_slice(&data).map_err(|_| error!(TokenError::VenueFailure))
    }

    fn add_liquidity(
        &mut self,
        host: &mut dyn VenueHost,
        token_amount: u128,
        base_amount: u128,
        recipient: Pubkey,
    ) -> Result<LiquidityReceipt> {
        let token = host.token_address();
        let pair = self.pair(&token);
        host.transfer_from(self.router, token, pair, token_amount)?;

        let data = self.call(
            ADD_LIQUIDITY_IX,
            &AddLiquidityArgs {
                token_amount,
                base_amount,
                recipient,
            },
        )?;
        let receipt =
            ReceiptData::try_from_slice(&data).map_err(|_| error!(TokenError::VenueFailure))?;
        require!(
            receipt.token_used <= token_amount,
            TokenError::VenueFailure
        );

        // the pool keeps only what it paired; the rest goes back untaxed
        let unused = token_amount - receipt.token_used;
        if unused > 0 {
            host.transfer(pair, token, unused)?;
        }

        Ok(LiquidityReceipt {
            token_used: receipt.token_used,
            base_used: receipt.base_used,
            lp_minted: receipt.lp_minted,
        })
    }
}

/// Anchor's global instruction discriminator for `name`.
pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    let digest = hash(format!("global:{name}").as_bytes()).to_bytes();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}
