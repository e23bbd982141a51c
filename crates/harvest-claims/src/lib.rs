//! # harvest-claims
//!
//! The campaign accrual and claim engine.
//!
//! A claim request enters the [`engine::ClaimEngine`], which verifies the
//! caller-supplied Merkle proofs (inclusion for existing snapshot members,
//! adjacency for new members), converts the tracked-accrual delta into
//! token units, compares against the claim ledger, and pays out the
//! positive difference. Re-claiming with the same or a stale proof never
//! double-pays.
//!
//! ## Modules
//!
//! - [`traits`] — Capability interfaces to the lending market and token service
//! - [`proof`] — Caller-supplied, ephemeral proof structures
//! - [`accrual`] — Tracked-accrual to token-unit conversion
//! - [`membership`] — New-member adjacency proof verification
//! - [`ledger`] — Idempotent, monotonic claimed-amount ledger
//! - [`engine`] — Claim orchestration and admin surface

pub mod accrual;
pub mod engine;
pub mod ledger;
pub mod membership;
pub mod proof;
pub mod traits;

use harvest_campaign::CampaignError;
use harvest_types::{Address, Amount};

/// Error types for claim operations.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    /// A delegated claim without permission from the source account.
    #[error("caller {} lacks permission from {}", hex::encode(caller), hex::encode(src))]
    NotPermitted {
        /// The account whose rewards were claimed.
        src: Address,
        /// The caller lacking delegation.
        caller: Address,
    },

    /// Malformed claim input (length mismatch, bad neighbor ordering,
    /// non-adjacent neighbor leaves).
    #[error("bad data: {0}")]
    BadData(String),

    /// A Merkle proof failed verification.
    #[error("invalid {kind} proof for account {}", hex::encode(account))]
    InvalidProof {
        /// Which proof failed: "start", "finish", "left neighbor", …
        kind: &'static str,
        /// The account the proof was presented for.
        account: Address,
    },

    /// No matching campaign or asset configuration.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The external payout service reported failure.
    #[error(
        "transfer of {amount} units of token {} to {} failed",
        hex::encode(token),
        hex::encode(recipient)
    )]
    TransferFailed {
        /// The reward token.
        token: Address,
        /// The intended recipient.
        recipient: Address,
        /// The amount that could not be paid.
        amount: Amount,
    },

    /// The tracked accrual fell below the proven start baseline.
    #[error("tracked accrual {tracked} below start baseline {start}")]
    AccrualUnderflow {
        /// The tracked (or finish-snapshot) accrual.
        tracked: Amount,
        /// The proven start baseline.
        start: Amount,
    },

    /// Arithmetic overflow while converting accrual to token units.
    #[error("arithmetic overflow in accrual conversion")]
    Overflow,

    /// Campaign lookup or configuration error.
    #[error(transparent)]
    Campaign(#[from] CampaignError),
}

/// Convenience result type for claim operations.
pub type Result<T> = std::result::Result<T, ClaimError>;
