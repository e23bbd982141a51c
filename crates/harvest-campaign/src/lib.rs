//! # harvest-campaign
//!
//! Campaign data model for the Harvest reward protocol.
//!
//! A campaign is a bounded reward-distribution period for a lending market:
//! a start snapshot root, an optional finish snapshot root, and a set of
//! reward tokens each carrying a conversion config. Campaigns are
//! append-only per market and referenced by positional index.
//!
//! ## Modules
//!
//! - [`rescale`] — Accrual-scale to token-scale conversion resolver
//! - [`snapshot`] — Sorted snapshot leaf encoding and tree construction
//! - [`registry`] — Governor-gated campaign registry

pub mod registry;
pub mod rescale;
pub mod snapshot;

use harvest_types::Address;

/// Error types for campaign configuration and lookup.
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    /// A governor-only operation was called by another address.
    #[error("caller {} is not the governor", hex::encode(caller))]
    NotAuthorized {
        /// The offending caller.
        caller: Address,
    },

    /// A decimal or accrual scale exceeds the representable range.
    #[error("invalid scale: {0}")]
    InvalidScale(String),

    /// Malformed campaign input (duplicate token, zero root, bad index).
    #[error("bad data: {0}")]
    BadData(String),

    /// The market has no campaigns registered.
    #[error("no campaigns for market {}", hex::encode(market))]
    NotSupported {
        /// The market that was queried.
        market: Address,
    },

    /// The campaign already has a finish root; the transition is one-way.
    #[error("campaign {campaign} for market {} is already closed", hex::encode(market))]
    AlreadyClosed {
        /// The market the campaign belongs to.
        market: Address,
        /// The campaign index.
        campaign: u64,
    },
}

/// Convenience result type for campaign operations.
pub type Result<T> = std::result::Result<T, CampaignError>;
