mod common;

use anchor_lang::prelude::Pubkey;

use common::{
    assert_conserved, assert_token_error, balance, fixture, fixture_with_supply, legs,
    liquifying_fixture, venue, Fixture, MockVenue, Reentry, SUPPLY,
};
use liquify_token::constants::BURN_ADDRESS;
use liquify_token::errors::TokenError;
use liquify_token::liquidity::LiquifyState;

#[test]
fn default_tax_splits_between_burn_and_liquidity() {
    let Fixture {
        mut token,
        alice,
        bob,
        ..
    } = fixture();

    token.transfer(alice, bob, 12_345).unwrap();

    assert_eq!(balance(&token, &bob), 11_728);
    assert_eq!(balance(&token, &BURN_ADDRESS), 123);
    assert_eq!(balance(&token, &token.address()), 494);
    assert_eq!(balance(&token, &alice), SUPPLY - 12_345);
    // burn is routed, not destroyed
    assert_eq!(token.total_supply(), SUPPLY);
    assert_conserved(&token);
}

#[test]
fn small_transfers_round_tax_to_zero() {
    let Fixture {
        mut token,
        alice,
        bob,
        ..
    } = fixture();
    token.transfer(alice, bob, 19).unwrap();
    assert_eq!(balance(&token, &bob), 19);
    assert_eq!(balance(&token, &token.address()), 0);
}

#[test]
fn burn_sink_and_zero_rate_are_untaxed() {
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = fixture();

    token.transfer(alice, BURN_ADDRESS, 1_000).unwrap();
    assert_eq!(balance(&token, &BURN_ADDRESS), 1_000);

    token.update_transfer_tax_rate(owner, 0).unwrap();
    token.transfer(alice, bob, 1_000).unwrap();
    assert_eq!(balance(&token, &bob), 1_000);
    assert_conserved(&token);
}

#[test]
fn full_burn_rate_sends_whole_tax_to_sink() {
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = fixture();
    token.update_burn_rate(owner, 100).unwrap();

    token.transfer(alice, bob, 10_000).unwrap();
    assert_eq!(balance(&token, &BURN_ADDRESS), 500);
    assert_eq!(balance(&token, &token.address()), 0);
}

#[test]
fn anti_whale_caps_peer_transfers() {
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = fixture();
    // 0.5% of 10_000_000
    assert_eq!(token.max_transfer_amount().unwrap(), 50_000);

    assert_token_error(token.transfer(alice, bob, 50_001), TokenError::TransferTooLarge);
    assert_eq!(balance(&token, &alice), SUPPLY);

    token.transfer(alice, bob, 50_000).unwrap();

    // recipients holding a role are never capped
    token.transfer(alice, owner, 60_000).unwrap();
    token.transfer(alice, token.address(), 60_000).unwrap();

    // excluded senders are not capped either
    token.set_excluded_from_anti_whale(owner, alice, true).unwrap();
    token.transfer(alice, bob, 60_000).unwrap();
    assert_conserved(&token);
}

#[test]
fn cap_follows_supply_and_rate() {
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = fixture();

    token.mint(owner, owner, 10_000_000).unwrap();
    assert_eq!(token.max_transfer_amount().unwrap(), 100_000);
    token.transfer(alice, bob, 100_000).unwrap();

    token.update_max_transfer_amount_rate(owner, 100).unwrap();
    assert_eq!(token.max_transfer_amount().unwrap(), 200_000);

    // a zero rate switches the cap off
    token.update_max_transfer_amount_rate(owner, 0).unwrap();
    token.transfer(alice, bob, 5_000_000).unwrap();
}

#[test]
fn admin_updates_need_the_operator() {
    let Fixture {
        mut token,
        owner,
        alice,
        ..
    } = fixture();

    assert_token_error(token.update_transfer_tax_rate(alice, 100), TokenError::Unauthorized);
    assert_token_error(token.update_burn_rate(alice, 10), TokenError::Unauthorized);
    assert_token_error(
        token.update_max_transfer_amount_rate(alice, 10),
        TokenError::Unauthorized,
    );
    assert_token_error(
        token.update_swap_and_liquify_enabled(alice, true),
        TokenError::Unauthorized,
    );
    assert_token_error(
        token.update_min_amount_to_liquify(alice, 1),
        TokenError::Unauthorized,
    );
    assert_token_error(
        token.set_excluded_from_fee(alice, alice, true),
        TokenError::Unauthorized,
    );
    assert_token_error(
        token.update_liquidity_venue_router(alice, MockVenue::new()),
        TokenError::Unauthorized,
    );

    assert_token_error(token.update_transfer_tax_rate(owner, 1_001), TokenError::RateTooHigh);
    assert_token_error(token.update_burn_rate(owner, 101), TokenError::RateTooHigh);
    assert_token_error(
        token.update_max_transfer_amount_rate(owner, 10_001),
        TokenError::RateTooHigh,
    );

    assert_eq!(token.transfer_tax_rate(), 500);
    assert_eq!(token.burn_rate(), 20);
    assert_eq!(token.max_transfer_amount_rate(), 50);
    assert!(!token.swap_and_liquify_enabled());
}

#[test]
fn operator_role_moves_with_transfer() {
    let Fixture {
        mut token,
        owner,
        alice,
        ..
    } = fixture();
    let operator = Pubkey::new_unique();

    token.transfer_operator(owner, operator).unwrap();
    assert_eq!(token.operator(), operator);
    assert_eq!(token.owner(), owner);

    token.update_transfer_tax_rate(operator, 1_000).unwrap();
    assert_token_error(token.update_burn_rate(owner, 0), TokenError::Unauthorized);

    // minting stays with the owner
    assert_token_error(token.mint(operator, alice, 1), TokenError::Unauthorized);
    token.mint(owner, alice, 1).unwrap();
}

#[test]
fn router_update_records_pair() {
    let Fixture {
        mut token, owner, ..
    } = fixture();
    let venue = MockVenue::new();
    let (router, pair) = (venue.router, venue.pair);

    token.update_liquidity_venue_router(owner, venue).unwrap();
    assert_eq!(token.liquidity_router(), Some(router));
    assert_eq!(token.liquidity_pair(), Some(pair));
}

#[test]
fn accrual_triggers_swap_and_liquify() {
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = liquifying_fixture(MockVenue::new(), 400);
    let pair = token.liquidity_pair().unwrap();
    let router = token.liquidity_router().unwrap();

    token.transfer(alice, bob, 10_000).unwrap();

    assert_eq!(balance(&token, &bob), 9_500);
    assert_eq!(balance(&token, &BURN_ADDRESS), 100);
    // all 400 accrued tokens ended in the pool, half sold and half paired
    assert_eq!(balance(&token, &token.address()), 0);
    assert_eq!(balance(&token, &pair), 400);
    assert_eq!(venue(&token).lp_of(&owner), 200);
    assert_eq!(venue(&token).swaps, 1);
    assert_eq!(venue(&token).base_of(&token.address()), 0);
    assert_eq!(token.allowance(&token.address(), &router).unwrap(), 0);
    assert_eq!(token.liquify_state(), LiquifyState::Idle);
    assert_eq!(
        legs(&token),
        vec![
            (alice, bob, 9_500),
            (alice, BURN_ADDRESS, 100),
            (alice, token.address(), 400),
            (token.address(), pair, 200),
            (token.address(), pair, 200),
        ]
    );
    assert_conserved(&token);
}

#[test]
fn below_threshold_only_accrues() {
    let Fixture {
        mut token,
        alice,
        bob,
        ..
    } = liquifying_fixture(MockVenue::new(), 401);

    token.transfer(alice, bob, 10_000).unwrap();
    assert_eq!(balance(&token, &token.address()), 400);
    assert_eq!(venue(&token).swaps, 0);
}

#[test]
fn disabled_liquify_only_accrues() {
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = liquifying_fixture(MockVenue::new(), 1);
    token.update_swap_and_liquify_enabled(owner, false).unwrap();

    token.transfer(alice, bob, 10_000).unwrap();
    assert_eq!(balance(&token, &token.address()), 400);
    assert_eq!(venue(&token).swaps, 0);
}

#[test]
fn sales_from_the_pair_never_trigger() {
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = liquifying_fixture(MockVenue::new(), 400);
    let pair = token.liquidity_pair().unwrap();
    token.mint(owner, pair, 1_000_000).unwrap();

    token.transfer(pair, alice, 10_000).unwrap();
    assert_eq!(balance(&token, &token.address()), 400);
    assert_eq!(venue(&token).swaps, 0);

    // the next ordinary transfer liquifies everything accrued so far
    token.transfer(alice, bob, 100).unwrap();
    assert_eq!(balance(&token, &token.address()), 0);
    assert_eq!(venue(&token).swaps, 1);
    assert_eq!(venue(&token).lp_of(&owner), 202);
    assert_conserved(&token);
}

#[test]
fn refund_from_the_pair_is_untaxed() {
    let mut venue_double = MockVenue::new();
    venue_double.refund = 50;
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = liquifying_fixture(venue_double, 400);
    let pair = token.liquidity_pair().unwrap();

    token.transfer(alice, bob, 10_000).unwrap();

    assert_eq!(balance(&token, &token.address()), 50);
    assert_eq!(balance(&token, &pair), 350);
    assert_eq!(balance(&token, &BURN_ADDRESS), 100);
    assert_eq!(venue(&token).lp_of(&owner), 150);
    assert_conserved(&token);
}

#[test]
fn failed_swap_rolls_back_only_the_cycle() {
    let mut venue_double = MockVenue::new();
    venue_double.fail_swap = true;
    let Fixture {
        mut token,
        alice,
        bob,
        ..
    } = liquifying_fixture(venue_double, 400);
    let pair = token.liquidity_pair().unwrap();
    let router = token.liquidity_router().unwrap();

    token.transfer(alice, bob, 10_000).unwrap();

    assert_eq!(balance(&token, &bob), 9_500);
    assert_eq!(balance(&token, &token.address()), 400);
    assert_eq!(balance(&token, &pair), 0);
    assert_eq!(token.allowance(&token.address(), &router).unwrap(), 0);
    assert_eq!(token.liquify_state(), LiquifyState::Idle);
    // the rolled-back swap leg is not logged
    assert_eq!(
        legs(&token),
        vec![
            (alice, bob, 9_500),
            (alice, BURN_ADDRESS, 100),
            (alice, token.address(), 400),
        ]
    );
    assert_conserved(&token);
}

#[test]
fn failed_add_liquidity_undoes_the_swap_leg() {
    let mut venue_double = MockVenue::new();
    venue_double.fail_add_liquidity = true;
    let Fixture {
        mut token,
        alice,
        bob,
        ..
    } = liquifying_fixture(venue_double, 400);
    let pair = token.liquidity_pair().unwrap();

    token.transfer(alice, bob, 10_000).unwrap();
    assert_eq!(balance(&token, &token.address()), 400);
    assert_eq!(balance(&token, &pair), 0);

    // the lock was released, so a later transfer can retry
    token.transfer(alice, bob, 100).unwrap();
    assert_eq!(balance(&token, &token.address()), 404);
    assert_conserved(&token);
}

#[test]
fn fee_exempt_accounts_still_trigger_accrued_liquify() {
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = liquifying_fixture(MockVenue::new(), 400);

    token.transfer(alice, bob, 8_000).unwrap();
    assert_eq!(balance(&token, &token.address()), 320);

    token.set_excluded_from_fee(owner, alice, true).unwrap();
    token.transfer(alice, bob, 1).unwrap();
    assert_eq!(balance(&token, &token.address()), 320);

    token.update_min_amount_to_liquify(owner, 320).unwrap();
    token.transfer(alice, bob, 1).unwrap();
    assert_eq!(balance(&token, &token.address()), 0);
    assert_eq!(venue(&token).swaps, 1);
}

#[test]
fn transfer_from_accumulates_tax_with_earlier_transfers() {
    let Fixture {
        mut token,
        alice,
        bob,
        ..
    } = fixture();
    let carol = Pubkey::new_unique();

    token.transfer(alice, bob, 12_345).unwrap();
    token.approve(alice, bob, 22_345).unwrap();
    token.transfer_from(bob, alice, carol, 22_345).unwrap();

    assert_eq!(balance(&token, &bob), 11_728);
    assert_eq!(balance(&token, &carol), 21_228);
    assert_eq!(balance(&token, &BURN_ADDRESS), 346);
    assert_eq!(balance(&token, &token.address()), 1_388);
    assert_eq!(token.allowance(&alice, &bob).unwrap(), 0);
    assert_conserved(&token);
}

#[test]
fn anti_whale_reference_supply() {
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = fixture_with_supply(25_000);
    token.mint(owner, owner, 25_000).unwrap();
    assert_eq!(token.max_transfer_amount().unwrap(), 250);

    let carol = Pubkey::new_unique();
    token.approve(alice, carol, 1_000).unwrap();
    assert_token_error(token.transfer(alice, bob, 251), TokenError::TransferTooLarge);
    assert_token_error(
        token.transfer_from(carol, alice, bob, 251),
        TokenError::TransferTooLarge,
    );
    assert_eq!(token.allowance(&alice, &carol).unwrap(), 1_000);
    token.transfer(alice, bob, 250).unwrap();

    // role recipients
    let operator = Pubkey::new_unique();
    token.transfer_operator(owner, operator).unwrap();
    token.transfer(alice, BURN_ADDRESS, 251).unwrap();
    token.transfer(alice, operator, 1_000).unwrap();
    token.transfer(alice, owner, 251).unwrap();
    token.transfer(alice, token.address(), 251).unwrap();

    // excluded senders; roles alone only exempt the receiving side
    token.transfer(owner, bob, 251).unwrap();
    assert_token_error(token.transfer(operator, bob, 251), TokenError::TransferTooLarge);
    token
        .set_excluded_from_anti_whale(operator, operator, true)
        .unwrap();
    token.transfer(operator, bob, 251).unwrap();

    assert_eq!(token.total_supply(), 50_000);
    assert_conserved(&token);
}

#[test]
fn cap_stays_exact_for_huge_supplies() {
    let supply = u128::MAX / 10_000;
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = fixture_with_supply(supply);
    token.update_max_transfer_amount_rate(owner, 10_000).unwrap();
    assert_eq!(token.max_transfer_amount().unwrap(), supply);

    token.transfer(alice, owner, 1_000).unwrap();
    token.transfer(alice, BURN_ADDRESS, 1_000).unwrap();
    token.transfer(alice, bob, supply / 2).unwrap();
    assert_conserved(&token);
}

#[test]
fn huge_transfers_are_taxed_exactly() {
    let Fixture {
        mut token,
        owner,
        alice,
        ..
    } = fixture_with_supply(u128::MAX / 100);
    let amount = u128::MAX / 200;

    token.transfer(alice, owner, amount).unwrap();

    let tax = amount / 10_000 * 500 + amount % 10_000 * 500 / 10_000;
    assert_eq!(balance(&token, &owner), amount - tax);
    assert_eq!(
        balance(&token, &BURN_ADDRESS) + balance(&token, &token.address()),
        tax
    );
    assert_conserved(&token);
}

#[test]
fn reentrant_transfers_during_a_cycle_are_untaxed_and_never_nest() {
    let carol = Pubkey::new_unique();
    let dave = Pubkey::new_unique();
    let mut venue_double = MockVenue::new();
    venue_double.reenter = Some(Reentry {
        owner: carol,
        recipient: dave,
        amount: 1_000,
    });
    // low threshold: the token balance stays above it for the whole cycle
    let Fixture {
        mut token,
        owner,
        alice,
        bob,
    } = liquifying_fixture(venue_double, 100);
    let pair = token.liquidity_pair().unwrap();
    let router = token.liquidity_router().unwrap();
    token.mint(owner, carol, 5_000).unwrap();
    token.approve(carol, router, 1_000).unwrap();

    token.transfer(alice, bob, 10_000).unwrap();

    assert_eq!(venue(&token).swaps, 1);
    assert_eq!(balance(&token, &dave), 1_000);
    assert_eq!(balance(&token, &carol), 4_000);
    assert_eq!(token.allowance(&carol, &router).unwrap(), 0);
    assert_eq!(balance(&token, &token.address()), 0);
    assert_eq!(balance(&token, &pair), 400);
    assert_eq!(venue(&token).lp_of(&owner), 200);
    assert_eq!(token.liquify_state(), LiquifyState::Idle);
    assert!(legs(&token).contains(&(carol, dave, 1_000)));
    assert_conserved(&token);
}
