//! New-member adjacency proofs.
//!
//! An account that joined the market after a campaign's start snapshot has
//! no leaf to prove inclusion with. Instead it proves **absence**: two
//! neighbor leaves that bound its address in the sorted tree, adjacent by
//! leaf index, each independently proven against the start root. Adjacency
//! is what rules out a third leaf — a pre-existing snapshot entry —
//! strictly between them. Sentinel leaves at the lowest and highest
//! address values guarantee bounding neighbors exist for every real
//! address.
//!
//! A verified new member claims with a start baseline of zero.

use harvest_campaign::snapshot;
use harvest_crypto::merkle;
use harvest_types::{Address, Hash};

use crate::proof::NeighborProof;
use crate::{ClaimError, Result};

/// Verify that `claimant` is absent from the start snapshot under `root`.
///
/// # Errors
///
/// - [`ClaimError::BadData`] if the neighbors do not strictly bound the
///   claimant's address, or are not adjacent leaves
/// - [`ClaimError::InvalidProof`] if either neighbor proof fails against
///   the start root
pub fn verify_new_member(
    claimant: &Address,
    root: &Hash,
    left: &NeighborProof,
    right: &NeighborProof,
) -> Result<()> {
    if !(left.account < *claimant && *claimant < right.account) {
        return Err(ClaimError::BadData(format!(
            "neighbors {}..{} do not bound claimant {}",
            hex::encode(left.account),
            hex::encode(right.account),
            hex::encode(claimant)
        )));
    }
    if right.leaf_index.checked_sub(left.leaf_index) != Some(1) {
        return Err(ClaimError::BadData(format!(
            "neighbor leaves {} and {} are not adjacent",
            left.leaf_index, right.leaf_index
        )));
    }

    let left_leaf = snapshot::leaf_hash(&left.account, left.leaf_index, left.start_accrued);
    if !merkle::verify_proof(left_leaf, &left.proof, root) {
        return Err(ClaimError::InvalidProof { kind: "left neighbor", account: left.account });
    }
    let right_leaf = snapshot::leaf_hash(&right.account, right.leaf_index, right.start_accrued);
    if !merkle::verify_proof(right_leaf, &right.proof, root) {
        return Err(ClaimError::InvalidProof { kind: "right neighbor", account: right.account });
    }

    Ok(())
}
