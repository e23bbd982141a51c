//! Snapshot leaf encoding and sorted-tree construction.
//!
//! A campaign snapshot records `(address, leaf_index, accrued)` for every
//! account present at the snapshot block, sorted by address. Two sentinel
//! leaves at the lowest and highest possible addresses guarantee that any
//! real address has two bounding neighbors, which the new-member proof
//! scheme relies on.
//!
//! ## Leaf encoding
//!
//! `address (20 bytes) || leaf_index (u64 LE) || accrued (u128 LE)`,
//! double-hashed via [`harvest_crypto::blake3::merkle_leaf`]. Off-chain
//! generators must use this exact byte order to match.

use harvest_crypto::{blake3, merkle};
use harvest_types::{Address, Amount, Hash, ADDRESS_MAX, ADDRESS_MIN};
use serde::{Deserialize, Serialize};

use crate::{CampaignError, Result};

/// Encode a snapshot leaf value.
pub fn encode_leaf(account: &Address, leaf_index: u64, accrued: Amount) -> [u8; 44] {
    let mut out = [0u8; 44];
    out[..20].copy_from_slice(account);
    out[20..28].copy_from_slice(&leaf_index.to_le_bytes());
    out[28..].copy_from_slice(&accrued.to_le_bytes());
    out
}

/// Compute the (double-hashed) leaf hash for a snapshot entry.
pub fn leaf_hash(account: &Address, leaf_index: u64, accrued: Amount) -> Hash {
    blake3::merkle_leaf(&encode_leaf(account, leaf_index, accrued))
}

/// One account's recorded accrual at snapshot time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// The account address.
    pub account: Address,
    /// The tracked accrual recorded for the account.
    pub accrued: Amount,
}

/// A proven position in a snapshot tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSlot {
    /// The leaf index of the entry in the sorted tree.
    pub leaf_index: u64,
    /// The accrual value recorded in the leaf.
    pub accrued: Amount,
    /// Sibling path from the leaf to the root.
    pub proof: Vec<Hash>,
}

/// A fully built snapshot tree: sorted entries, sentinels, leaf hashes.
///
/// This mirrors the off-chain snapshot generator; the claim engine itself
/// only ever sees roots and caller-supplied proofs.
#[derive(Clone, Debug)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
    leaf_hashes: Vec<Hash>,
}

impl Snapshot {
    /// Build a snapshot tree from unsorted entries.
    ///
    /// Sentinel leaves (accrued 0) are added at [`ADDRESS_MIN`] and
    /// [`ADDRESS_MAX`]; entries are sorted by address and indexed by
    /// position.
    ///
    /// # Errors
    ///
    /// - [`CampaignError::BadData`] on duplicate accounts or entries at a
    ///   sentinel address
    pub fn new(mut entries: Vec<SnapshotEntry>) -> Result<Self> {
        for entry in &entries {
            if entry.account == ADDRESS_MIN || entry.account == ADDRESS_MAX {
                return Err(CampaignError::BadData(format!(
                    "account {} collides with a sentinel leaf",
                    hex::encode(entry.account)
                )));
            }
        }
        entries.sort_by(|a, b| a.account.cmp(&b.account));
        if entries.windows(2).any(|w| w[0].account == w[1].account) {
            return Err(CampaignError::BadData(
                "duplicate account in snapshot".to_string(),
            ));
        }

        let mut full = Vec::with_capacity(entries.len() + 2);
        full.push(SnapshotEntry { account: ADDRESS_MIN, accrued: 0 });
        full.extend(entries);
        full.push(SnapshotEntry { account: ADDRESS_MAX, accrued: 0 });

        let leaf_hashes = full
            .iter()
            .enumerate()
            .map(|(i, e)| leaf_hash(&e.account, i as u64, e.accrued))
            .collect();

        Ok(Self { entries: full, leaf_hashes })
    }

    /// The Merkle root over the sorted leaves.
    pub fn root(&self) -> Hash {
        merkle::build_root(&self.leaf_hashes)
    }

    /// Number of leaves, sentinels included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the tree holds only the two sentinel leaves.
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 2
    }

    /// Prove inclusion of `account`, if it is present in the snapshot.
    pub fn prove(&self, account: &Address) -> Option<SnapshotSlot> {
        let index = self
            .entries
            .binary_search_by(|e| e.account.cmp(account))
            .ok()?;
        let proof = merkle::prove(&self.leaf_hashes, index)?;
        Some(SnapshotSlot {
            leaf_index: index as u64,
            accrued: self.entries[index].accrued,
            proof,
        })
    }

    /// Prove the absence of `account` via its two bounding neighbors.
    ///
    /// Returns the proven slots of the adjacent leaves strictly below and
    /// above `account`, or `None` if the account is actually present.
    pub fn prove_absence(&self, account: &Address) -> Option<(Address, SnapshotSlot, Address, SnapshotSlot)> {
        let right = match self.entries.binary_search_by(|e| e.account.cmp(account)) {
            Ok(_) => return None,
            Err(insert_at) => insert_at,
        };
        // Sentinels guarantee 0 < right < len.
        let left = right - 1;
        let left_slot = SnapshotSlot {
            leaf_index: left as u64,
            accrued: self.entries[left].accrued,
            proof: merkle::prove(&self.leaf_hashes, left)?,
        };
        let right_slot = SnapshotSlot {
            leaf_index: right as u64,
            accrued: self.entries[right].accrued,
            proof: merkle::prove(&self.leaf_hashes, right)?,
        };
        Some((
            self.entries[left].account,
            left_slot,
            self.entries[right].account,
            right_slot,
        ))
    }
}
