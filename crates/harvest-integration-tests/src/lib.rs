//! Integration test crate for the Harvest reward protocol.
//!
//! The library holds the shared test doubles for the two external
//! capabilities (the lending market's accrual tracker and the token
//! service) plus proof-building helpers; the `tests/` directory contains
//! the end-to-end scenarios that exercise the workspace crates together.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p harvest-integration-tests
//! ```

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

use harvest_campaign::snapshot::Snapshot;
use harvest_claims::proof::{FinishProof, MemberProof, NeighborProof, NewMemberProof};
use harvest_claims::traits::{AccrualSource, ValueTransfer};
use harvest_types::{Address, Amount};

/// In-memory accrual tracker double.
///
/// Tracks per-(market, account) accrual values that tests move forward
/// explicitly, records every `accrue_account` call, and counts live reads
/// so closed-campaign tests can assert the tracker was never consulted.
#[derive(Default)]
pub struct FixedTracker {
    scales: BTreeMap<Address, u64>,
    accrued: BTreeMap<(Address, Address), Amount>,
    permissions: BTreeSet<(Address, Address, Address)>,
    /// Every `(market, account)` refresh request, in call order.
    pub accrue_calls: Vec<(Address, Address)>,
    /// Number of `base_tracking_accrued` reads.
    pub reads: Cell<usize>,
}

impl FixedTracker {
    /// Register a market with its accrual scale.
    pub fn with_market(mut self, market: Address, scale: u64) -> Self {
        self.scales.insert(market, scale);
        self
    }

    /// Set the tracked accrual for an account.
    pub fn set_accrued(&mut self, market: Address, account: Address, value: Amount) {
        self.accrued.insert((market, account), value);
    }

    /// Grant `spender` delegated permission from `owner`.
    pub fn allow(&mut self, market: Address, owner: Address, spender: Address) {
        self.permissions.insert((market, owner, spender));
    }
}

impl AccrualSource for FixedTracker {
    fn base_accrual_scale(&self, market: &Address) -> Option<u64> {
        self.scales.get(market).copied()
    }

    fn base_tracking_accrued(&self, market: &Address, account: &Address) -> Amount {
        self.reads.set(self.reads.get() + 1);
        self.accrued.get(&(*market, *account)).copied().unwrap_or(0)
    }

    fn accrue_account(&mut self, market: &Address, account: &Address) {
        self.accrue_calls.push((*market, *account));
    }

    fn has_permission(&self, market: &Address, owner: &Address, spender: &Address) -> bool {
        self.permissions.contains(&(*market, *owner, *spender))
    }
}

/// In-memory token service double with per-token balances.
#[derive(Default)]
pub struct RecordingBank {
    decimals: BTreeMap<Address, u32>,
    balances: BTreeMap<Address, Amount>,
    /// Every successful `(token, recipient, amount)` payout, in call order.
    pub payouts: Vec<(Address, Address, Amount)>,
}

impl RecordingBank {
    /// Register a token with its decimal count and distributor balance.
    pub fn with_token(mut self, token: Address, decimals: u32, balance: Amount) -> Self {
        self.decimals.insert(token, decimals);
        self.balances.insert(token, balance);
        self
    }

    /// Set a token's distributor balance.
    pub fn set_balance(&mut self, token: Address, balance: Amount) {
        self.balances.insert(token, balance);
    }

    /// Total paid to `recipient` in `token` across all payouts.
    pub fn total_paid(&self, token: &Address, recipient: &Address) -> Amount {
        self.payouts
            .iter()
            .filter(|(t, r, _)| t == token && r == recipient)
            .map(|(_, _, amount)| amount)
            .sum()
    }
}

impl ValueTransfer for RecordingBank {
    fn decimals(&self, token: &Address) -> Option<u32> {
        self.decimals.get(token).copied()
    }

    fn transfer(&mut self, token: &Address, to: &Address, amount: Amount) -> bool {
        let balance = self.balances.entry(*token).or_insert(0);
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        self.payouts.push((*token, *to, amount));
        true
    }
}

/// Build an existing-member proof from a start snapshot (live campaign).
pub fn member_proof(snap: &Snapshot, account: &Address) -> MemberProof {
    let slot = snap.prove(account).expect("account present in snapshot");
    MemberProof {
        leaf_index: slot.leaf_index,
        start_accrued: slot.accrued,
        finish_accrued: 0,
        start_proof: slot.proof,
        finish_proof: Vec::new(),
    }
}

/// Build an existing-member proof carrying a finish-snapshot proof.
pub fn member_proof_closed(start: &Snapshot, finish: &Snapshot, account: &Address) -> MemberProof {
    let mut proof = member_proof(start, account);
    let slot = finish.prove(account).expect("account present in finish snapshot");
    proof.finish_accrued = slot.accrued;
    proof.finish_proof = slot.proof;
    proof
}

/// Build a new-member adjacency proof, optionally with a finish proof.
pub fn new_member_proof(
    start: &Snapshot,
    claimant: &Address,
    finish: Option<&Snapshot>,
) -> NewMemberProof {
    let (left_account, left_slot, right_account, right_slot) = start
        .prove_absence(claimant)
        .expect("claimant absent from start snapshot");
    NewMemberProof {
        left: NeighborProof {
            account: left_account,
            leaf_index: left_slot.leaf_index,
            start_accrued: left_slot.accrued,
            proof: left_slot.proof,
        },
        right: NeighborProof {
            account: right_account,
            leaf_index: right_slot.leaf_index,
            start_accrued: right_slot.accrued,
            proof: right_slot.proof,
        },
        finish: finish.map(|snap| {
            let slot = snap.prove(claimant).expect("claimant present in finish snapshot");
            FinishProof {
                leaf_index: slot.leaf_index,
                finish_accrued: slot.accrued,
                proof: slot.proof,
            }
        }),
    }
}
