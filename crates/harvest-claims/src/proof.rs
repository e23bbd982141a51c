//! Caller-supplied proof structures.
//!
//! Proofs are ephemeral: validity is checked once per claim call and the
//! structure is discarded. Nothing here is persisted.

use harvest_types::{Address, Amount, Hash};
use serde::{Deserialize, Serialize};

/// Proof for an account present in the campaign's start snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProof {
    /// The account's leaf index in both snapshot trees.
    pub leaf_index: u64,
    /// The accrual recorded in the start snapshot.
    pub start_accrued: Amount,
    /// The accrual recorded in the finish snapshot; ignored while the
    /// campaign is live.
    pub finish_accrued: Amount,
    /// Sibling path against the start root.
    pub start_proof: Vec<Hash>,
    /// Sibling path against the finish root; empty while live.
    pub finish_proof: Vec<Hash>,
}

/// Finish-snapshot inclusion proof, required once a campaign is closed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishProof {
    /// The account's leaf index in the finish tree.
    pub leaf_index: u64,
    /// The accrual recorded in the finish snapshot.
    pub finish_accrued: Amount,
    /// Sibling path against the finish root.
    pub proof: Vec<Hash>,
}

/// One bounding neighbor in the sorted start snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborProof {
    /// The neighbor's address.
    pub account: Address,
    /// The neighbor's leaf index.
    pub leaf_index: u64,
    /// The neighbor's recorded start accrual.
    pub start_accrued: Amount,
    /// Sibling path against the start root.
    pub proof: Vec<Hash>,
}

/// Proof that a claimant is absent from the start snapshot.
///
/// Two adjacent, correctly ordered neighbor leaves bound the claimant's
/// address in the sorted tree; adjacency proves no third leaf exists
/// between them. The claimant's baseline accrual is zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMemberProof {
    /// The neighbor strictly below the claimant.
    pub left: NeighborProof,
    /// The neighbor strictly above the claimant.
    pub right: NeighborProof,
    /// The claimant's own finish proof; required once the campaign closes.
    pub finish: Option<FinishProof>,
}
