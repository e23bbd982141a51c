//! Integration test: full campaign lifecycle.
//!
//! Exercises the complete create → accrue → claim → close → settle flow:
//! 1. Governor creates a two-token campaign over a start snapshot
//! 2. Alice accrues a day of tracked units and claims (both tokens)
//! 3. Re-claiming with the same proof pays nothing
//! 4. Further accrual pays only the delta
//! 5. The campaign closes; final settlement uses the finish snapshot only
//! 6. Payout totals conserve: sum of claims equals final accrued value

use harvest_campaign::snapshot::{Snapshot, SnapshotEntry};
use harvest_claims::engine::ClaimEngine;
use harvest_integration_tests::{
    member_proof, member_proof_closed, FixedTracker, RecordingBank,
};
use harvest_types::events::EngineEvent;
use harvest_types::{Address, Amount, FACTOR_SCALE};

const GOVERNOR: Address = [0xAA; 20];
const MARKET: Address = [0x01; 20];
/// 18-decimal token at multiplier 1e18.
const TOKEN_A: Address = [0xA1; 20];
/// 6-decimal token at multiplier 0.5e18 (half rate).
const TOKEN_B: Address = [0xB1; 20];
const ALICE: Address = [0x10; 20];
const BOB: Address = [0x30; 20];

/// Tracker scale: 1e6 raw units per whole accrual unit.
const SCALE: u64 = 1_000_000;
/// One day of whole accrual units, in raw tracker units.
const DAY: Amount = 86_400 * SCALE as Amount;
/// Half a day, in raw tracker units.
const HALF_DAY: Amount = DAY / 2;
/// Upscale factor for an 18-decimal token over a 1e6-scale tracker.
const UPSCALE_A: Amount = 1_000_000_000_000;

fn engine() -> (ClaimEngine<FixedTracker, RecordingBank>, Snapshot) {
    let tracker = FixedTracker::default().with_market(MARKET, SCALE);
    let bank = RecordingBank::default()
        .with_token(TOKEN_A, 18, Amount::MAX / 2)
        .with_token(TOKEN_B, 6, Amount::MAX / 2);
    let mut engine = ClaimEngine::new(GOVERNOR, tracker, bank);

    let snap = Snapshot::new(vec![
        SnapshotEntry { account: ALICE, accrued: 100 },
        SnapshotEntry { account: BOB, accrued: 50 },
    ])
    .expect("start snapshot");

    engine
        .create_campaign(
            &GOVERNOR,
            &MARKET,
            snap.root(),
            &[(TOKEN_A, FACTOR_SCALE), (TOKEN_B, FACTOR_SCALE / 2)],
        )
        .expect("create campaign");
    (engine, snap)
}

#[test]
fn full_lifecycle_create_claim_close_settle() {
    let (mut engine, snap) = engine();

    // ========================================================
    // Step 1: a day of accrual, first claim pays both tokens
    // ========================================================
    engine.source_mut().set_accrued(MARKET, ALICE, 100 + DAY);
    let proof = member_proof(&snap, &ALICE);

    let claims = engine.claim(&MARKET, 0, &ALICE, true, &proof).expect("first claim");
    assert_eq!(claims.len(), 2, "both tokens pay out");
    // Payouts arrive in the campaign's fixed token order.
    assert_eq!(claims[0].token, TOKEN_A);
    assert_eq!(claims[0].amount, DAY * UPSCALE_A);
    assert_eq!(claims[1].token, TOKEN_B);
    assert_eq!(claims[1].amount, DAY / 2);
    assert_eq!(engine.source().accrue_calls, vec![(MARKET, ALICE)]);

    // ========================================================
    // Step 2: identical claim is a no-op
    // ========================================================
    let repeat = engine.claim(&MARKET, 0, &ALICE, false, &proof).expect("repeat claim");
    assert!(repeat.is_empty());
    assert_eq!(engine.transfers().payouts.len(), 2);

    // ========================================================
    // Step 3: further accrual pays only the delta
    // ========================================================
    engine.source_mut().set_accrued(MARKET, ALICE, 100 + DAY + HALF_DAY);
    let claims = engine.claim(&MARKET, 0, &ALICE, false, &proof).expect("delta claim");
    assert_eq!(claims[0].amount, HALF_DAY * UPSCALE_A);
    assert_eq!(claims[1].amount, HALF_DAY / 2);

    // ========================================================
    // Step 4: close the campaign; settlement is snapshot-only
    // ========================================================
    let finish = Snapshot::new(vec![
        SnapshotEntry { account: ALICE, accrued: 100 + 2 * DAY },
        SnapshotEntry { account: BOB, accrued: 50 + 1_000 * SCALE as Amount },
    ])
    .expect("finish snapshot");
    engine
        .close_campaign(&GOVERNOR, &MARKET, 0, finish.root())
        .expect("close campaign");

    // A nonsense live value proves the tracker is no longer consulted.
    engine.source_mut().set_accrued(MARKET, ALICE, Amount::MAX / 4);
    let reads_before = engine.source().reads.get();

    let closed_proof = member_proof_closed(&snap, &finish, &ALICE);
    let claims = engine
        .claim(&MARKET, 0, &ALICE, false, &closed_proof)
        .expect("final settlement");
    assert_eq!(claims[0].amount, HALF_DAY * UPSCALE_A);
    assert_eq!(engine.source().reads.get(), reads_before, "no live read after close");

    // ========================================================
    // Step 5: conservation across all of alice's claims
    // ========================================================
    assert_eq!(
        engine.transfers().total_paid(&TOKEN_A, &ALICE),
        2 * DAY * UPSCALE_A,
        "total TOKEN_A payouts equal the final accrued value"
    );
    assert_eq!(engine.transfers().total_paid(&TOKEN_B, &ALICE), DAY);
    assert_eq!(
        engine.ledger().claimed(&MARKET, 0, &ALICE, &TOKEN_A),
        2 * DAY * UPSCALE_A
    );

    // ========================================================
    // Step 6: bob settles once, straight from the snapshots
    // ========================================================
    let bob_proof = member_proof_closed(&snap, &finish, &BOB);
    let claims = engine.claim(&MARKET, 0, &BOB, false, &bob_proof).expect("bob claim");
    assert_eq!(claims[0].amount, 1_000 * SCALE as Amount * UPSCALE_A);
    assert_eq!(claims[1].amount, 1_000 * SCALE as Amount / 2);
}

#[test]
fn event_log_orders_and_serializes() {
    let (mut engine, snap) = engine();
    engine.source_mut().set_accrued(MARKET, ALICE, 100 + DAY);
    let proof = member_proof(&snap, &ALICE);
    engine.claim(&MARKET, 0, &ALICE, false, &proof).expect("claim");

    let events = engine.events();
    assert!(matches!(events[0], EngineEvent::CampaignCreated(_)));
    let claimed: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::RewardClaimed(c) => Some(c),
            _ => None,
        })
        .collect();
    assert_eq!(claimed.len(), 2);
    assert_eq!(claimed[0].token, TOKEN_A);
    assert_eq!(claimed[1].token, TOKEN_B);

    // The log is consumed by external indexers; it must serialize cleanly.
    let json = serde_json::to_string(events).expect("serialize event log");
    assert!(json.contains("reward_claimed"));
    assert!(json.contains("campaign_created"));
}

#[test]
fn stale_proof_after_override_pays_nothing() {
    let (mut engine, snap) = engine();
    engine.source_mut().set_accrued(MARKET, ALICE, 100 + DAY);

    // Governor zeroes alice's retroactive rewards before claims open.
    engine
        .set_rewards_claimed(
            &GOVERNOR,
            &MARKET,
            0,
            &ALICE,
            &[(TOKEN_A, DAY * UPSCALE_A), (TOKEN_B, DAY / 2)],
        )
        .expect("override");

    let proof = member_proof(&snap, &ALICE);
    let claims = engine.claim(&MARKET, 0, &ALICE, false, &proof).expect("claim");
    assert!(claims.is_empty(), "override absorbed the whole accrual");

    // New accrual past the override is claimable again.
    engine.source_mut().set_accrued(MARKET, ALICE, 100 + DAY + HALF_DAY);
    let claims = engine.claim(&MARKET, 0, &ALICE, false, &proof).expect("claim");
    assert_eq!(claims[0].amount, HALF_DAY * UPSCALE_A);
}
