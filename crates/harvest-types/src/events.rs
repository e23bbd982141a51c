//! Events emitted by the claim engine and campaign registry.
//!
//! Events are recorded in call order; for a multi-token claim the
//! [`RewardClaimed`] entries appear in the campaign's fixed token order.
//! Consumers (indexers, reconciliation jobs) rely on that ordering.

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, CampaignId, Hash};

/// A reward payout was issued and recorded in the claim ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardClaimed {
    /// The market the campaign belongs to.
    pub market: Address,
    /// The campaign index within the market.
    pub campaign: CampaignId,
    /// The account whose accrual was claimed.
    pub src: Address,
    /// The recipient of the payout (equals `src` unless delegated).
    pub recipient: Address,
    /// The reward token paid out.
    pub token: Address,
    /// The amount paid, in token units.
    pub amount: Amount,
}

/// A new campaign was registered for a market.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCreated {
    pub market: Address,
    pub campaign: CampaignId,
    /// Root of the sorted start snapshot tree.
    pub start_root: Hash,
    /// Reward tokens participating, in campaign order.
    pub tokens: Vec<Address>,
}

/// A campaign transitioned from live to closed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignClosed {
    pub market: Address,
    pub campaign: CampaignId,
    /// Root of the finish snapshot tree.
    pub finish_root: Hash,
}

/// The governor authority was handed to a new address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorTransferred {
    pub old_governor: Address,
    pub new_governor: Address,
}

/// An administrative override of a user's claimed amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsClaimedSet {
    pub market: Address,
    pub campaign: CampaignId,
    pub account: Address,
    pub token: Address,
    /// The claimed value after the override.
    pub amount: Amount,
}

/// Every event the engine can append to its log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineEvent {
    RewardClaimed(RewardClaimed),
    CampaignCreated(CampaignCreated),
    CampaignClosed(CampaignClosed),
    GovernorTransferred(GovernorTransferred),
    RewardsClaimedSet(RewardsClaimedSet),
}
