//! BuyNow on the native rail: purchase, settlement, refunds, withdrawals.

mod common;

use common::{FEES, Harness, UNIVERSE};
use escrowpay_auth::PartyKey;
use escrowpay_ledger::NativeRail;
use escrowpay_types::constants::{DAY, HOUR};
use escrowpay_types::{EscrowError, PaymentEvent, PaymentId, PaymentState};

/// Buyer pays `amount` entirely with attached value.
fn purchase(
    h: &mut Harness<NativeRail>,
    label: &str,
    buyer: &PartyKey,
    seller: &PartyKey,
    amount: u128,
) -> PaymentId {
    let input = h.buy_now_input(label, buyer, seller, amount);
    let op = h.sign_operator(&input);
    let ctx = h.ctx(&buyer.address()).with_value(amount);
    h.engine.buy_now(&ctx, &input, &op, None).unwrap();
    input.payment_id
}

// =============================================================================
// Fee arithmetic
// =============================================================================

#[test]
fn fee_fixtures() {
    let h = Harness::native();
    let fee = |amount, bps| h.engine.compute_fee_amount(amount, bps).unwrap();
    assert_eq!(fee(9, 500), 0);
    assert_eq!(fee(100, 500), 5);
    assert_eq!(fee(123_456, 7), 86);
    assert_eq!(
        fee(1_234_560_000_000_000_000_000, 10),
        1_234_560_000_000_000_000
    );
}

// =============================================================================
// Happy path
// =============================================================================

#[test]
fn buy_finalize_withdraw() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&buyer.address(), 1_000);

    let id = purchase(&mut h, "item-1", &buyer, &seller, 300);

    assert_eq!(h.engine.payment_state(&id, h.now), PaymentState::AssetTransferring);
    let info = h.engine.payment_info(&id).unwrap();
    assert_eq!(info.amount, 300);
    assert_eq!(info.operator, h.operator.address());
    assert_eq!(info.fees_collector, FEES);
    assert_eq!(info.expiration_time, h.now + 30 * DAY);
    assert_eq!(h.engine.funding().bank().balance_of(&buyer.address()), 700);
    h.engine.check_solvency().unwrap();

    h.advance(HOUR);
    let (result, sig) = h.signed_result(id, true);
    h.engine
        .finalize(&h.ctx(&PartyKey::generate().address()), &result, &sig)
        .unwrap();

    assert_eq!(h.engine.payment_state(&id, h.now), PaymentState::Paid);
    assert_eq!(h.engine.balance_of(&seller.address()), 285);
    assert_eq!(h.engine.balance_of(&FEES), 15);
    h.engine.check_solvency().unwrap();

    let paid = h.engine.withdraw(&h.ctx(&seller.address())).unwrap();
    assert_eq!(paid, 285);
    assert_eq!(h.engine.balance_of(&seller.address()), 0);
    assert_eq!(h.engine.funding().bank().balance_of(&seller.address()), 285);
    h.engine.check_solvency().unwrap();

    let names: Vec<_> = h.engine.events().iter().map(PaymentEvent::name).collect();
    assert_eq!(&names[names.len() - 3..], ["BuyNow", "Paid", "Withdraw"]);
}

#[test]
fn event_log_exports_as_json() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&buyer.address(), 300);
    let id = purchase(&mut h, "item-json", &buyer, &seller, 300);

    let events = h.engine.take_events();
    let json = serde_json::to_string(&events).unwrap();
    assert!(json.contains("\"NewSeller\""));
    assert!(json.contains("\"BuyNow\""));

    let back: Vec<PaymentEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, events);
    assert_eq!(
        back.last(),
        Some(&PaymentEvent::BuyNow {
            payment_id: id,
            buyer: buyer.address(),
            seller: seller.address(),
        })
    );
    assert!(h.engine.events().is_empty());
}

#[test]
fn relayed_buy_now_with_buyer_signature() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let relayer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&relayer.address(), 300);

    let input = h.buy_now_input("relayed", &buyer, &seller, 300);
    let op = h.sign_operator(&input);
    let buyer_sig = h.sign_as(&buyer, &input);
    let ctx = h.ctx(&relayer.address()).with_value(300);
    h.engine
        .relayed_buy_now(&ctx, &input, &buyer_sig, &op, None)
        .unwrap();

    // The relayer paid; the buyer owns the purchase.
    assert_eq!(h.engine.funding().bank().balance_of(&relayer.address()), 0);
    assert_eq!(h.engine.payment_info(&input.payment_id).unwrap().buyer, buyer.address());
}

// =============================================================================
// Settlement edge cases
// =============================================================================

#[test]
fn double_finalize_fails_both_times() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&buyer.address(), 300);
    let id = purchase(&mut h, "twice", &buyer, &seller, 300);

    let (result, sig) = h.signed_result(id, true);
    let ctx = h.ctx(&buyer.address());
    h.engine.finalize(&ctx, &result, &sig).unwrap();

    for _ in 0..2 {
        let err = h.engine.finalize(&ctx, &result, &sig).unwrap_err();
        assert!(matches!(
            err,
            EscrowError::NotAssetTransferring {
                state: PaymentState::Paid
            }
        ));
    }
    assert_eq!(h.engine.balance_of(&seller.address()), 285);
}

#[test]
fn failed_delivery_refunds_buyer() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&buyer.address(), 300);
    let id = purchase(&mut h, "failed", &buyer, &seller, 300);

    let (result, sig) = h.signed_result(id, false);
    h.engine
        .finalize(&h.ctx(&seller.address()), &result, &sig)
        .unwrap();

    assert_eq!(h.engine.payment_state(&id, h.now), PaymentState::Refunded);
    assert_eq!(h.engine.balance_of(&buyer.address()), 300);
    assert_eq!(h.engine.balance_of(&seller.address()), 0);
    assert!(h.engine.events().contains(&PaymentEvent::BuyerRefunded {
        payment_id: id,
        buyer: buyer.address()
    }));
}

#[test]
fn timeout_refund_by_anyone() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    let stranger = PartyKey::generate();
    h.mint(&buyer.address(), 300);
    let id = purchase(&mut h, "slow", &buyer, &seller, 300);

    h.advance(30 * DAY - 1);
    assert!(!h.engine.accepts_refunds(&id, h.now));
    assert!(matches!(
        h.engine.refund(&h.ctx(&stranger.address()), &id),
        Err(EscrowError::RefundNotAccepted(_))
    ));

    h.advance(1);
    assert!(h.engine.accepts_refunds(&id, h.now));
    h.engine.refund(&h.ctx(&stranger.address()), &id).unwrap();
    assert_eq!(h.engine.balance_of(&buyer.address()), 300);
    assert_eq!(h.engine.payment_state(&id, h.now), PaymentState::Refunded);
    h.engine.check_solvency().unwrap();
}

#[test]
fn rotated_operator_resolves_pending_payment() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&buyer.address(), 300);
    let id = purchase(&mut h, "rotate", &buyer, &seller, 300);

    let old = h.operator.clone();
    let new = PartyKey::generate();
    h.engine
        .set_universe_operator(&h.owner_ctx(), UNIVERSE, new.address())
        .unwrap();

    let (result, stale_sig) = h.signed_result(id, true);
    assert_eq!(h.operator.address(), old.address());
    assert!(matches!(
        h.engine.finalize(&h.ctx(&buyer.address()), &result, &stale_sig),
        Err(EscrowError::OnlyOperatorCanSignResult)
    ));

    let fresh_sig = h.sign_as(&new, &result);
    h.engine
        .finalize(&h.ctx(&buyer.address()), &result, &fresh_sig)
        .unwrap();
    // The snapshot still names the operator at creation.
    assert_eq!(h.engine.payment_info(&id).unwrap().operator, old.address());
}

// =============================================================================
// Rejections leave no trace
// =============================================================================

#[test]
fn entry_validation() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&buyer.address(), 1_000);
    let ctx = h.ctx(&buyer.address()).with_value(300);

    let mut zero = h.buy_now_input("zero", &buyer, &seller, 0);
    let op = h.sign_operator(&zero);
    assert!(matches!(
        h.engine.buy_now(&h.ctx(&buyer.address()), &zero, &op, None),
        Err(EscrowError::ZeroAmount)
    ));

    zero.amount = 300;
    zero.deadline = h.now - 1;
    let op = h.sign_operator(&zero);
    assert!(matches!(
        h.engine.buy_now(&ctx, &zero, &op, None),
        Err(EscrowError::DeadlineExpired { .. })
    ));

    let same = h.buy_now_input("self", &seller, &seller, 300);
    let op = h.sign_operator(&same);
    assert!(matches!(
        h.engine.buy_now(&h.ctx(&seller.address()).with_value(300), &same, &op, None),
        Err(EscrowError::BuyerSellerCoincide)
    ));

    let unregistered = PartyKey::generate();
    let input = h.buy_now_input("unregistered", &buyer, &unregistered, 300);
    let op = h.sign_operator(&input);
    assert!(matches!(
        h.engine.buy_now(&ctx, &input, &op, None),
        Err(EscrowError::SellerNotRegistered(_))
    ));

    let stranger = PartyKey::generate();
    let input = h.buy_now_input("stranger", &buyer, &seller, 300);
    let op = h.sign_operator(&input);
    assert!(matches!(
        h.engine.buy_now(&h.ctx(&stranger.address()).with_value(300), &input, &op, None),
        Err(EscrowError::OnlyBuyer)
    ));
    let forged = h.sign_as(&stranger, &input);
    assert!(matches!(
        h.engine
            .relayed_buy_now(&h.ctx(&stranger.address()), &input, &forged, &op, None),
        Err(EscrowError::IncorrectBuyerSignature)
    ));

    assert_eq!(h.engine.funding().bank().balance_of(&buyer.address()), 1_000);
    assert_eq!(
        h.engine.payment_state(&input.payment_id, h.now),
        PaymentState::NotStarted
    );
}

#[test]
fn fee_cap_per_universe() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&buyer.address(), 300);
    h.engine
        .set_universe_max_fee_bps(&h.owner_ctx(), UNIVERSE, 400)
        .unwrap();

    let input = h.buy_now_input("fee", &buyer, &seller, 300);
    let op = h.sign_operator(&input);
    let ctx = h.ctx(&buyer.address()).with_value(300);
    assert!(matches!(
        h.engine.buy_now(&ctx, &input, &op, None),
        Err(EscrowError::FeeAboveMax {
            fee_bps: 500,
            max_fee_bps: 400
        })
    ));

    assert!(matches!(
        h.engine
            .set_universe_max_fee_bps(&h.ctx(&buyer.address()), UNIVERSE, 600),
        Err(EscrowError::NotOwner { .. })
    ));
}

#[test]
fn operator_must_observe() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&buyer.address(), 300);
    h.engine
        .set_universe_operator(&h.owner_ctx(), UNIVERSE, seller.address())
        .unwrap();

    let input = h.buy_now_input("observer", &buyer, &seller, 300);
    let op = h.sign_as(&seller, &input);
    let ctx = h.ctx(&buyer.address()).with_value(300);
    assert!(matches!(
        h.engine.buy_now(&ctx, &input, &op, None),
        Err(EscrowError::OperatorNotObserver)
    ));
}

#[test]
fn identifiers_are_single_use() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&buyer.address(), 600);
    let id = purchase(&mut h, "once", &buyer, &seller, 300);

    let input = h.buy_now_input("once", &buyer, &seller, 300);
    let op = h.sign_operator(&input);
    let ctx = h.ctx(&buyer.address()).with_value(300);
    assert!(matches!(
        h.engine.buy_now(&ctx, &input, &op, None),
        Err(EscrowError::IncorrectPaymentState {
            state: PaymentState::AssetTransferring
        })
    ));

    let (result, sig) = h.signed_result(id, false);
    h.engine.finalize(&ctx.with_value(0), &result, &sig).unwrap();
    assert!(matches!(
        h.engine.buy_now(&ctx, &input, &op, None),
        Err(EscrowError::IncorrectPaymentState {
            state: PaymentState::Refunded
        })
    ));
}

// =============================================================================
// Funding from the ledger
// =============================================================================

#[test]
fn ledger_balance_funds_next_purchase() {
    let mut h = Harness::native();
    let alice = PartyKey::generate();
    let bob = PartyKey::generate();
    let carol = h.seller();
    h.mint(&bob.address(), 300);
    h.mint(&alice.address(), 100);
    h.engine.register_as_seller(&h.ctx(&alice.address())).unwrap();

    // Alice sells for 300 and keeps 285 in the ledger.
    let sale = purchase(&mut h, "alice-sells", &bob, &alice, 300);
    let (result, sig) = h.signed_result(sale, true);
    h.engine.finalize(&h.ctx(&bob.address()), &result, &sig).unwrap();
    assert_eq!(h.engine.balance_of(&alice.address()), 285);

    let split = h.engine.split_funding_sources(&alice.address(), 300);
    assert_eq!((split.local_funds, split.external_funds), (285, 15));
    assert!(h.engine.enough_funds_available(&alice.address(), 300));
    assert_eq!(h.engine.max_funds_available(&alice.address()), 385);

    let input = h.buy_now_input("alice-buys", &alice, &carol, 300);
    let op = h.sign_operator(&input);

    // Too little attached value.
    let short = h.ctx(&alice.address()).with_value(14);
    assert!(matches!(
        h.engine.buy_now(&short, &input, &op, None),
        Err(EscrowError::FundsOutOfRange {
            provided: 14,
            required: 15
        })
    ));
    // More than the whole amount.
    let over = h.ctx(&alice.address()).with_value(301);
    assert!(matches!(
        h.engine.buy_now(&over, &input, &op, None),
        Err(EscrowError::FundsAboveAmount { .. })
    ));
    assert_eq!(h.engine.balance_of(&alice.address()), 285);

    // Excess over the external share is kept in the ledger.
    let ok = h.ctx(&alice.address()).with_value(20);
    h.engine.buy_now(&ok, &input, &op, None).unwrap();
    assert_eq!(h.engine.balance_of(&alice.address()), 5);
    assert_eq!(h.engine.funding().bank().balance_of(&alice.address()), 80);
    h.engine.check_solvency().unwrap();
}

#[test]
fn split_always_covers_requirement() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    h.mint(&buyer.address(), 1_000);
    let id = purchase(&mut h, "split", &buyer, &seller, 700);
    let (result, sig) = h.signed_result(id, false);
    h.engine.finalize(&h.ctx(&buyer.address()), &result, &sig).unwrap();

    for _ in 0..500 {
        let need = u128::from(rand::random::<u32>() % 2_000);
        let s = h.engine.split_funding_sources(&buyer.address(), need);
        assert_eq!(s.local_funds + s.external_funds, need);
        assert_eq!(s.local_funds, need.min(700));
    }
}

// =============================================================================
// Withdrawal authorization
// =============================================================================

#[test]
fn finalize_and_withdraw_honours_lock() {
    let mut h = Harness::native();
    let buyer = PartyKey::generate();
    let seller = h.seller();
    let relayer = PartyKey::generate();
    h.mint(&buyer.address(), 600);

    let first = purchase(&mut h, "fw-1", &buyer, &seller, 300);
    let second = purchase(&mut h, "fw-2", &buyer, &seller, 300);

    h.engine.set_only_user_can_withdraw(&h.ctx(&seller.address()), true);
    let (result, sig) = h.signed_result(first, true);
    assert!(matches!(
        h.engine
            .finalize_and_withdraw(&h.ctx(&relayer.address()), &result, &sig),
        Err(EscrowError::NotAuthorizedToWithdraw { .. })
    ));
    assert_eq!(h.engine.payment_state(&first, h.now), PaymentState::AssetTransferring);

    h.engine
        .finalize_and_withdraw(&h.ctx(&seller.address()), &result, &sig)
        .unwrap();
    assert_eq!(h.engine.balance_of(&seller.address()), 0);
    assert_eq!(h.engine.funding().bank().balance_of(&seller.address()), 285);

    // The buyer never locked, so anyone can refund-and-withdraw for them.
    h.advance(30 * DAY);
    h.engine
        .refund_and_withdraw(&h.ctx(&relayer.address()), &second)
        .unwrap();
    assert_eq!(h.engine.funding().bank().balance_of(&buyer.address()), 300);
    assert_eq!(h.engine.funding().bank().balance_of(&relayer.address()), 0);
    h.engine.check_solvency().unwrap();
}
