mod common;

use anchor_lang::prelude::Pubkey;
use proptest::prelude::*;

use common::{assert_conserved, balance, liquifying_fixture, Fixture, MockVenue};
use liquify_token::constants::BURN_ADDRESS;
use liquify_token::liquidity::LiquifyState;
use liquify_token::state::FeeConfig;

#[derive(Clone, Debug)]
enum Op {
    Transfer { from: usize, to: usize, amount: u128 },
    Approve { owner: usize, spender: usize, amount: u128 },
    TransferFrom { spender: usize, owner: usize, to: usize, amount: u128 },
    SetTaxRate(u16),
    SetBurnRate(u16),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..4usize, 0..4usize, 0..80_000u128)
            .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
        1 => (0..4usize, 0..4usize, 0..80_000u128)
            .prop_map(|(owner, spender, amount)| Op::Approve { owner, spender, amount }),
        2 => (0..4usize, 0..4usize, 0..4usize, 0..80_000u128)
            .prop_map(|(spender, owner, to, amount)| Op::TransferFrom { spender, owner, to, amount }),
        1 => (0..=1_000u16).prop_map(Op::SetTaxRate),
        1 => (0..=100u16).prop_map(Op::SetBurnRate),
    ]
}

proptest! {
    #[test]
    fn fee_split_accounts_for_every_unit(
        amount in 0..u128::MAX / 10_000,
        transfer_tax_rate in 0..=1_000u16,
        burn_rate in 0..=100u16,
    ) {
        let fees = FeeConfig { transfer_tax_rate, burn_rate };
        let split = fees.compute_fee(amount).unwrap();
        prop_assert!(split.tax <= amount);
        prop_assert_eq!(split.burn_part + split.liquidity_part, split.tax);
        prop_assert_eq!(split.tax, amount * u128::from(transfer_tax_rate) / 10_000);
    }

    #[test]
    fn supply_is_conserved_and_lock_released(
        ops in proptest::collection::vec(op(), 1..40),
        refund in 0..100u128,
    ) {
        let mut venue = MockVenue::new();
        venue.refund = refund;
        let Fixture { mut token, owner, alice, bob } = liquifying_fixture(venue, 1_000);
        let pair = token.liquidity_pair().unwrap();
        let holders: [Pubkey; 4] = [alice, bob, pair, Pubkey::new_unique()];
        let supply = token.total_supply();

        for op in ops {
            let burned_before = balance(&token, &BURN_ADDRESS);
            // failures are expected (caps, balances, allowances); state must stay sound either way
            let _ = match op {
                Op::Transfer { from, to, amount } => {
                    token.transfer(holders[from], holders[to], amount)
                }
                Op::Approve { owner: o, spender, amount } => {
                    token.approve(holders[o], holders[spender], amount)
                }
                Op::TransferFrom { spender, owner: o, to, amount } => {
                    token.transfer_from(holders[spender], holders[o], holders[to], amount)
                }
                Op::SetTaxRate(rate) => token.update_transfer_tax_rate(owner, rate),
                Op::SetBurnRate(rate) => token.update_burn_rate(owner, rate),
            };

            prop_assert_eq!(token.total_supply(), supply);
            prop_assert_eq!(token.ledger().sum_of_balances(), Some(supply));
            prop_assert_eq!(token.liquify_state(), LiquifyState::Idle);
            prop_assert!(balance(&token, &BURN_ADDRESS) >= burned_before);
        }
        assert_conserved(&token);
    }
}
