//! The claimed-amount ledger.
//!
//! One monotonically non-decreasing `claimed` value per
//! `(market, campaign, account, token)`: the highest accrual value for
//! which a payout has already been issued. Keys are flattened into a
//! single composite key rather than nested maps.
//!
//! The claim path only ever raises a value. The administrative override
//! ([`ClaimLedger::set_claimed`]) may write arbitrary values, e.g. to
//! zero out retroactive rewards before a campaign is opened to claims.

use std::collections::BTreeMap;

use harvest_types::{Address, Amount, CampaignId};
use serde::{Deserialize, Serialize};

/// Composite ledger key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimKey {
    /// The market the campaign belongs to.
    pub market: Address,
    /// The campaign index.
    pub campaign: CampaignId,
    /// The claiming account.
    pub account: Address,
    /// The reward token.
    pub token: Address,
}

/// Flat map of claimed amounts.
#[derive(Clone, Debug, Default)]
pub struct ClaimLedger {
    claimed: BTreeMap<ClaimKey, Amount>,
}

impl ClaimLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The claimed amount for a key; zero if never claimed.
    pub fn claimed(
        &self,
        market: &Address,
        campaign: CampaignId,
        account: &Address,
        token: &Address,
    ) -> Amount {
        let key = ClaimKey { market: *market, campaign, account: *account, token: *token };
        self.claimed.get(&key).copied().unwrap_or(0)
    }

    /// Raise the claimed amount to `accrued`.
    ///
    /// The claim path guarantees `accrued` exceeds the recorded value; a
    /// lower value is ignored so the ledger can never move backwards
    /// through this method. Returns the previous value.
    pub fn record(
        &mut self,
        market: &Address,
        campaign: CampaignId,
        account: &Address,
        token: &Address,
        accrued: Amount,
    ) -> Amount {
        let key = ClaimKey { market: *market, campaign, account: *account, token: *token };
        let entry = self.claimed.entry(key).or_insert(0);
        let previous = *entry;
        if accrued > previous {
            *entry = accrued;
        }
        previous
    }

    /// Administrative override: set the claimed amount to an exact value.
    pub fn set_claimed(
        &mut self,
        market: &Address,
        campaign: CampaignId,
        account: &Address,
        token: &Address,
        amount: Amount,
    ) {
        let key = ClaimKey { market: *market, campaign, account: *account, token: *token };
        self.claimed.insert(key, amount);
    }

    /// Number of ledger entries.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// True if no claim was ever recorded.
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKET: Address = [0x01; 20];
    const USER: Address = [0x02; 20];
    const TOKEN: Address = [0x03; 20];

    #[test]
    fn test_unclaimed_is_zero() {
        let ledger = ClaimLedger::new();
        assert_eq!(ledger.claimed(&MARKET, 0, &USER, &TOKEN), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_record_raises_and_returns_previous() {
        let mut ledger = ClaimLedger::new();
        assert_eq!(ledger.record(&MARKET, 0, &USER, &TOKEN, 100), 0);
        assert_eq!(ledger.record(&MARKET, 0, &USER, &TOKEN, 250), 100);
        assert_eq!(ledger.claimed(&MARKET, 0, &USER, &TOKEN), 250);
    }

    #[test]
    fn test_record_never_lowers() {
        let mut ledger = ClaimLedger::new();
        ledger.record(&MARKET, 0, &USER, &TOKEN, 250);
        ledger.record(&MARKET, 0, &USER, &TOKEN, 100);
        assert_eq!(ledger.claimed(&MARKET, 0, &USER, &TOKEN), 250);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut ledger = ClaimLedger::new();
        ledger.record(&MARKET, 0, &USER, &TOKEN, 100);
        ledger.record(&MARKET, 1, &USER, &TOKEN, 7);
        assert_eq!(ledger.claimed(&MARKET, 0, &USER, &TOKEN), 100);
        assert_eq!(ledger.claimed(&MARKET, 1, &USER, &TOKEN), 7);
        assert_eq!(ledger.claimed(&MARKET, 0, &USER, &[0x04; 20]), 0);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_override_writes_exact_value() {
        let mut ledger = ClaimLedger::new();
        ledger.record(&MARKET, 0, &USER, &TOKEN, 100);
        ledger.set_claimed(&MARKET, 0, &USER, &TOKEN, 5);
        assert_eq!(ledger.claimed(&MARKET, 0, &USER, &TOKEN), 5);
    }
}
