//! Governor-gated campaign registry.
//!
//! Each market owns an append-only list of campaigns referenced by
//! positional index. Campaigns are created with a start snapshot root and
//! per-token asset configs, and are closed exactly once by recording a
//! finish root. Nothing is ever deleted or reordered.

use std::collections::BTreeMap;

use harvest_types::{Address, CampaignId, Hash};
use serde::{Deserialize, Serialize};

use crate::rescale::RescaleConfig;
use crate::{CampaignError, Result};

/// Per (campaign, token) conversion config.
///
/// `multiplier == 0` is the sentinel for "token not supported in this
/// campaign"; the registry refuses to create such a config, so a sentinel
/// can only be observed on lookup misses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Fixed-point reward rate, scaled by [`harvest_types::FACTOR_SCALE`].
    pub multiplier: u128,
    /// Ratio between the tracker's accrual scale and the token's scale.
    pub rescale_factor: u64,
    /// `true`: multiply rescaled deltas; `false`: divide (truncating).
    pub should_upscale: bool,
}

impl AssetConfig {
    /// Build a config from a resolved rescale and a reward multiplier.
    pub fn new(multiplier: u128, rescale: RescaleConfig) -> Self {
        Self {
            multiplier,
            rescale_factor: rescale.factor,
            should_upscale: rescale.should_upscale,
        }
    }
}

/// A bounded reward-distribution period for one market.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Campaign {
    /// Root of the sorted start snapshot tree.
    pub start_root: Hash,
    /// Root of the finish snapshot tree; `None` while the campaign is live.
    pub finish_root: Option<Hash>,
    /// Participating reward tokens, in the fixed campaign order.
    pub tokens: Vec<Address>,
    configs: BTreeMap<Address, AssetConfig>,
}

impl Campaign {
    /// Look up the config for `token`, if the campaign supports it.
    pub fn config(&self, token: &Address) -> Option<&AssetConfig> {
        self.configs.get(token).filter(|c| c.multiplier > 0)
    }

    /// Whether a finish root has been recorded.
    pub fn is_closed(&self) -> bool {
        self.finish_root.is_some()
    }
}

/// The registry of all campaigns, guarded by a single governor authority.
#[derive(Clone, Debug)]
pub struct CampaignRegistry {
    governor: Address,
    campaigns: BTreeMap<Address, Vec<Campaign>>,
}

impl CampaignRegistry {
    /// Create a registry governed by `governor`.
    pub fn new(governor: Address) -> Self {
        Self { governor, campaigns: BTreeMap::new() }
    }

    /// The current governor authority.
    pub fn governor(&self) -> &Address {
        &self.governor
    }

    fn require_governor(&self, caller: &Address) -> Result<()> {
        if caller != &self.governor {
            return Err(CampaignError::NotAuthorized { caller: *caller });
        }
        Ok(())
    }

    /// Register a new campaign for `market` and return its index.
    ///
    /// `assets` carries `(token, config)` pairs in the order claims will
    /// later pay out. Asset configs are immutable once registered.
    ///
    /// # Errors
    ///
    /// - [`CampaignError::NotAuthorized`] if `caller` is not the governor
    /// - [`CampaignError::BadData`] on a zero start root, an empty or
    ///   duplicated token list, a zero multiplier, or a zero rescale factor
    pub fn create_campaign(
        &mut self,
        caller: &Address,
        market: &Address,
        start_root: Hash,
        assets: Vec<(Address, AssetConfig)>,
    ) -> Result<CampaignId> {
        self.require_governor(caller)?;

        if start_root == [0u8; 32] {
            return Err(CampaignError::BadData("start root must be non-zero".to_string()));
        }
        if assets.is_empty() {
            return Err(CampaignError::BadData(
                "campaign must configure at least one token".to_string(),
            ));
        }

        let mut tokens = Vec::with_capacity(assets.len());
        let mut configs = BTreeMap::new();
        for (token, config) in assets {
            if config.multiplier == 0 {
                return Err(CampaignError::BadData(format!(
                    "zero multiplier for token {}",
                    hex::encode(token)
                )));
            }
            if config.rescale_factor == 0 {
                return Err(CampaignError::BadData(format!(
                    "zero rescale factor for token {}",
                    hex::encode(token)
                )));
            }
            if configs.insert(token, config).is_some() {
                return Err(CampaignError::BadData(format!(
                    "duplicate token {}",
                    hex::encode(token)
                )));
            }
            tokens.push(token);
        }

        let list = self.campaigns.entry(*market).or_default();
        let id = list.len() as CampaignId;
        list.push(Campaign { start_root, finish_root: None, tokens, configs });

        tracing::info!(
            market = %hex::encode(market),
            campaign = id,
            "campaign created"
        );
        Ok(id)
    }

    /// Record the finish root for a campaign, closing it.
    ///
    /// The transition is one-way and happens exactly once; a closed
    /// campaign switches the accrual source from the live tracker to the
    /// proven finish snapshot.
    ///
    /// # Errors
    ///
    /// - [`CampaignError::NotAuthorized`] if `caller` is not the governor
    /// - [`CampaignError::NotSupported`] / [`CampaignError::BadData`] on
    ///   unknown market or out-of-range campaign index
    /// - [`CampaignError::AlreadyClosed`] if a finish root is already set
    /// - [`CampaignError::BadData`] on a zero finish root
    pub fn close_campaign(
        &mut self,
        caller: &Address,
        market: &Address,
        campaign: CampaignId,
        finish_root: Hash,
    ) -> Result<()> {
        self.require_governor(caller)?;
        if finish_root == [0u8; 32] {
            return Err(CampaignError::BadData("finish root must be non-zero".to_string()));
        }

        let list = self
            .campaigns
            .get_mut(market)
            .ok_or(CampaignError::NotSupported { market: *market })?;
        let entry = list.get_mut(campaign as usize).ok_or_else(|| {
            CampaignError::BadData(format!(
                "campaign {campaign} out of range for market {}",
                hex::encode(market)
            ))
        })?;
        if entry.finish_root.is_some() {
            return Err(CampaignError::AlreadyClosed { market: *market, campaign });
        }
        entry.finish_root = Some(finish_root);

        tracing::info!(
            market = %hex::encode(market),
            campaign,
            "campaign closed"
        );
        Ok(())
    }

    /// Hand the governor authority to `new_governor`; returns the old one.
    ///
    /// # Errors
    ///
    /// - [`CampaignError::NotAuthorized`] if `caller` is not the governor
    pub fn set_governor(&mut self, caller: &Address, new_governor: Address) -> Result<Address> {
        self.require_governor(caller)?;
        let old = std::mem::replace(&mut self.governor, new_governor);
        tracing::info!(
            old = %hex::encode(old),
            new = %hex::encode(new_governor),
            "governor transferred"
        );
        Ok(old)
    }

    /// Resolve a campaign by `(market, index)`.
    ///
    /// # Errors
    ///
    /// - [`CampaignError::NotSupported`] if the market has no campaigns
    /// - [`CampaignError::BadData`] if the index is out of range
    pub fn campaign(&self, market: &Address, campaign: CampaignId) -> Result<&Campaign> {
        let list = self
            .campaigns
            .get(market)
            .ok_or(CampaignError::NotSupported { market: *market })?;
        list.get(campaign as usize).ok_or_else(|| {
            CampaignError::BadData(format!(
                "campaign {campaign} out of range for market {}",
                hex::encode(market)
            ))
        })
    }

    /// Number of campaigns registered for `market`.
    pub fn campaign_count(&self, market: &Address) -> usize {
        self.campaigns.get(market).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOVERNOR: Address = [0xAA; 20];
    const MARKET: Address = [0x01; 20];
    const TOKEN: Address = [0x02; 20];

    fn config() -> AssetConfig {
        AssetConfig { multiplier: harvest_types::FACTOR_SCALE, rescale_factor: 1, should_upscale: true }
    }

    fn registry_with_campaign() -> CampaignRegistry {
        let mut registry = CampaignRegistry::new(GOVERNOR);
        registry
            .create_campaign(&GOVERNOR, &MARKET, [0x11; 32], vec![(TOKEN, config())])
            .expect("create");
        registry
    }

    #[test]
    fn test_create_assigns_positional_ids() {
        let mut registry = registry_with_campaign();
        let id = registry
            .create_campaign(&GOVERNOR, &MARKET, [0x22; 32], vec![(TOKEN, config())])
            .expect("create second");
        assert_eq!(id, 1);
        assert_eq!(registry.campaign_count(&MARKET), 2);
    }

    #[test]
    fn test_non_governor_rejected() {
        let mut registry = registry_with_campaign();
        let intruder = [0xBB; 20];
        let result =
            registry.create_campaign(&intruder, &MARKET, [0x22; 32], vec![(TOKEN, config())]);
        assert!(matches!(result, Err(CampaignError::NotAuthorized { .. })));
    }

    #[test]
    fn test_zero_multiplier_rejected() {
        let mut registry = CampaignRegistry::new(GOVERNOR);
        let bad = AssetConfig { multiplier: 0, rescale_factor: 1, should_upscale: true };
        let result = registry.create_campaign(&GOVERNOR, &MARKET, [0x11; 32], vec![(TOKEN, bad)]);
        assert!(matches!(result, Err(CampaignError::BadData(_))));
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let mut registry = CampaignRegistry::new(GOVERNOR);
        let result = registry.create_campaign(
            &GOVERNOR,
            &MARKET,
            [0x11; 32],
            vec![(TOKEN, config()), (TOKEN, config())],
        );
        assert!(matches!(result, Err(CampaignError::BadData(_))));
    }

    #[test]
    fn test_close_is_one_way_and_once() {
        let mut registry = registry_with_campaign();
        registry
            .close_campaign(&GOVERNOR, &MARKET, 0, [0x33; 32])
            .expect("close");
        assert!(registry.campaign(&MARKET, 0).expect("campaign").is_closed());

        let again = registry.close_campaign(&GOVERNOR, &MARKET, 0, [0x44; 32]);
        assert!(matches!(again, Err(CampaignError::AlreadyClosed { .. })));
    }

    #[test]
    fn test_zero_finish_root_rejected() {
        let mut registry = registry_with_campaign();
        let result = registry.close_campaign(&GOVERNOR, &MARKET, 0, [0u8; 32]);
        assert!(matches!(result, Err(CampaignError::BadData(_))));
    }

    #[test]
    fn test_unknown_market_not_supported() {
        let registry = registry_with_campaign();
        let other = [0x99; 20];
        assert!(matches!(
            registry.campaign(&other, 0),
            Err(CampaignError::NotSupported { .. })
        ));
    }

    #[test]
    fn test_out_of_range_campaign_is_bad_data() {
        let registry = registry_with_campaign();
        assert!(matches!(
            registry.campaign(&MARKET, 1),
            Err(CampaignError::BadData(_))
        ));
    }

    #[test]
    fn test_config_lookup_filters_unsupported() {
        let registry = registry_with_campaign();
        let campaign = registry.campaign(&MARKET, 0).expect("campaign");
        assert!(campaign.config(&TOKEN).is_some());
        assert!(campaign.config(&[0x77; 20]).is_none());
    }

    #[test]
    fn test_set_governor_hands_over_authority() {
        let mut registry = registry_with_campaign();
        let new_governor = [0xCC; 20];
        let old = registry.set_governor(&GOVERNOR, new_governor).expect("transfer");
        assert_eq!(old, GOVERNOR);

        // Old governor can no longer administer.
        let result = registry.close_campaign(&GOVERNOR, &MARKET, 0, [0x33; 32]);
        assert!(matches!(result, Err(CampaignError::NotAuthorized { .. })));

        registry
            .close_campaign(&new_governor, &MARKET, 0, [0x33; 32])
            .expect("new governor closes");
    }
}
