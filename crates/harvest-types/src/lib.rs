//! # harvest-types
//!
//! Shared domain types used across the Harvest workspace.
//!
//! Harvest distributes accrued lending-market rewards through Merkle-proven
//! campaigns. The aliases and constants here are the vocabulary every other
//! crate speaks: market/token/account addresses, 32-byte hashes, and the
//! fixed-point scale used by campaign multipliers.

pub mod events;

/// A market, token, or account address (20 bytes).
pub type Address = [u8; 20];

/// A BLAKE3 hash (Merkle roots, nodes, leaves).
pub type Hash = [u8; 32];

/// A tracked-accrual or reward-token amount.
///
/// Amounts are `u128` because a `FACTOR_SCALE`-scaled multiplier applied to
/// a whole-token accrual overflows 64 bits immediately.
pub type Amount = u128;

/// Index of a campaign within a market's append-only campaign list.
pub type CampaignId = u64;

/// Fixed-point base for campaign multipliers (1e18).
pub const FACTOR_SCALE: u128 = 1_000_000_000_000_000_000;

/// The lowest possible address; start snapshots carry a sentinel leaf here.
pub const ADDRESS_MIN: Address = [0x00; 20];

/// The highest possible address; start snapshots carry a sentinel leaf here.
pub const ADDRESS_MAX: Address = [0xFF; 20];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_scale_is_1e18() {
        assert_eq!(FACTOR_SCALE, 10u128.pow(18));
    }

    #[test]
    fn test_sentinels_bound_every_real_address() {
        let addr: Address = [0x42; 20];
        assert!(ADDRESS_MIN < addr);
        assert!(addr < ADDRESS_MAX);
    }
}
