//! Merkle inclusion proofs over BLAKE3 hash trees.
//!
//! [`verify_proof`] is the primitive the claim engine uses for every proof
//! path: start-snapshot inclusion, finish-snapshot inclusion, and the two
//! neighbor proofs of the new-member scheme. It is a pure function of the
//! leaf hash, the sibling path, and the expected root.
//!
//! [`build_root`] and [`prove`] mirror the verifier exactly and exist so
//! that snapshot fixtures and off-chain generators produce trees the
//! verifier accepts. If the number of nodes at a level is odd, the last
//! node is duplicated to pad the level.

use crate::blake3;

/// Verify an inclusion proof for `leaf` against `root`.
///
/// `proof` is the sibling-hash path ordered leaf to root. The fold orders
/// each `(node, sibling)` pair by byte-wise value (see
/// [`blake3::merkle_inner`]), so the same routine verifies trees built
/// with either child ordering. Pure; never mutates state.
pub fn verify_proof(leaf: [u8; 32], proof: &[[u8; 32]], root: &[u8; 32]) -> bool {
    let computed = proof
        .iter()
        .fold(leaf, |node, sibling| blake3::merkle_inner(&node, sibling));
    computed == *root
}

/// Build a Merkle root from a list of leaf hashes.
///
/// Levels with an odd node count duplicate their last node. An empty leaf
/// set yields the all-zero root, which no proof verifies against.
pub fn build_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<[u8; 32]> = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut i = 0;
        while i < level.len() {
            let left = &level[i];
            let right = if i + 1 < level.len() { &level[i + 1] } else { &level[i] };
            next.push(blake3::merkle_inner(left, right));
            i += 2;
        }
        level = next;
    }
    level[0]
}

/// Produce the sibling path for the leaf at `index`, ordered leaf to root.
///
/// Returns `None` if `index` is out of range. The resulting path satisfies
/// `verify_proof(leaves[index], &path, &build_root(leaves))`.
pub fn prove(leaves: &[[u8; 32]], index: usize) -> Option<Vec<[u8; 32]>> {
    if index >= leaves.len() {
        return None;
    }

    let mut path = Vec::new();
    let mut level: Vec<[u8; 32]> = leaves.to_vec();
    let mut pos = index;

    while level.len() > 1 {
        let sibling_pos = if pos % 2 == 0 { pos + 1 } else { pos - 1 };
        // Odd levels duplicate their last node as the missing sibling.
        let sibling = if sibling_pos < level.len() {
            level[sibling_pos]
        } else {
            level[pos]
        };
        path.push(sibling);

        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut i = 0;
        while i < level.len() {
            let left = &level[i];
            let right = if i + 1 < level.len() { &level[i + 1] } else { &level[i] };
            next.push(blake3::merkle_inner(left, right));
            i += 2;
        }
        level = next;
        pos /= 2;
    }

    Some(path)
}
