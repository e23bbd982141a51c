//! Claim orchestration.
//!
//! The engine owns the campaign registry, the claim ledger, an append-only
//! event log, and the two injected capabilities (the lending market's
//! accrual tracker and the token transfer service). Every claim variant
//! funnels into one internal path:
//!
//! verify proofs → (optional) accrual refresh → per-token accrual
//! computation → ledger comparison → payout of the positive delta.
//!
//! All checks happen before any side effect. Owed amounts are staged
//! across every campaign in the call and paid with a single transfer per
//! token; each transfer commits together with the ledger entries and
//! events it covers, so paid value is always recorded and a failed
//! transfer leaves no unrecorded payout behind.

use std::collections::BTreeMap;

use harvest_campaign::registry::{AssetConfig, Campaign, CampaignRegistry};
use harvest_campaign::{rescale, snapshot, CampaignError};
use harvest_crypto::merkle;
use harvest_types::events::{
    CampaignClosed, CampaignCreated, EngineEvent, GovernorTransferred, RewardClaimed,
    RewardsClaimedSet,
};
use harvest_types::{Address, Amount, CampaignId, Hash};
use serde::{Deserialize, Serialize};

use crate::ledger::ClaimLedger;
use crate::proof::{MemberProof, NewMemberProof};
use crate::traits::{AccrualSource, ValueTransfer};
use crate::{accrual, membership, ClaimError, Result};

/// Read-only projection of a claim: total accrued and the payable delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardOwed {
    /// Total token units accrued since the campaign start.
    pub accrued: Amount,
    /// The part not yet paid out (`accrued - claimed`, floored at zero).
    pub owed: Amount,
}

/// Which proof scheme a claim arrived with.
enum ProofPath<'a> {
    /// Present in the start snapshot; inclusion proof.
    Member(&'a MemberProof),
    /// Absent from the start snapshot; adjacency proof, baseline zero.
    NewMember(&'a NewMemberProof),
}

/// The claim engine and administrative surface.
pub struct ClaimEngine<S, V> {
    registry: CampaignRegistry,
    ledger: ClaimLedger,
    source: S,
    transfers: V,
    events: Vec<EngineEvent>,
}

impl<S: AccrualSource, V: ValueTransfer> ClaimEngine<S, V> {
    /// Create an engine governed by `governor` over the two capabilities.
    pub fn new(governor: Address, source: S, transfers: V) -> Self {
        Self {
            registry: CampaignRegistry::new(governor),
            ledger: ClaimLedger::new(),
            source,
            transfers,
            events: Vec::new(),
        }
    }

    /// The campaign registry.
    pub fn registry(&self) -> &CampaignRegistry {
        &self.registry
    }

    /// The claim ledger.
    pub fn ledger(&self) -> &ClaimLedger {
        &self.ledger
    }

    /// Every event recorded so far, in emission order.
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// The injected accrual tracker.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the tracker (test setup, simulated time).
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// The injected transfer service.
    pub fn transfers(&self) -> &V {
        &self.transfers
    }

    /// Mutable access to the transfer service (test setup, funding).
    pub fn transfers_mut(&mut self) -> &mut V {
        &mut self.transfers
    }

    // ------------------------------------------------------------------
    // Claim surface
    // ------------------------------------------------------------------

    /// Claim `src`'s rewards for one campaign, paid to `src`.
    pub fn claim(
        &mut self,
        market: &Address,
        campaign: CampaignId,
        src: &Address,
        should_accrue: bool,
        proof: &MemberProof,
    ) -> Result<Vec<RewardClaimed>> {
        self.claim_inner(market, campaign, src, src, should_accrue, ProofPath::Member(proof))
    }

    /// Claim `src`'s rewards for one campaign, paid to `to`.
    ///
    /// # Errors
    ///
    /// - [`ClaimError::NotPermitted`] if `to != src` and `caller` holds no
    ///   delegated permission from `src` on the market
    pub fn claim_to(
        &mut self,
        market: &Address,
        campaign: CampaignId,
        caller: &Address,
        src: &Address,
        to: &Address,
        should_accrue: bool,
        proof: &MemberProof,
    ) -> Result<Vec<RewardClaimed>> {
        self.check_permission(market, caller, src, to)?;
        self.claim_inner(market, campaign, src, to, should_accrue, ProofPath::Member(proof))
    }

    /// Claim `src`'s rewards across several campaigns of one market.
    ///
    /// The accrual refresh runs at most once for the whole batch. The
    /// batch is all-or-nothing: every campaign is verified and staged
    /// before any value moves, and owed amounts are paid as a single
    /// transfer per token.
    pub fn claim_batch(
        &mut self,
        market: &Address,
        src: &Address,
        should_accrue: bool,
        campaigns: &[CampaignId],
        proofs: &[MemberProof],
    ) -> Result<Vec<RewardClaimed>> {
        let paths: Vec<ProofPath<'_>> = proofs.iter().map(ProofPath::Member).collect();
        self.claim_many(market, src, src, should_accrue, campaigns, &paths)
    }

    /// Batch variant of [`ClaimEngine::claim_to`].
    pub fn claim_to_batch(
        &mut self,
        market: &Address,
        caller: &Address,
        src: &Address,
        to: &Address,
        should_accrue: bool,
        campaigns: &[CampaignId],
        proofs: &[MemberProof],
    ) -> Result<Vec<RewardClaimed>> {
        self.check_permission(market, caller, src, to)?;
        let paths: Vec<ProofPath<'_>> = proofs.iter().map(ProofPath::Member).collect();
        self.claim_many(market, src, to, should_accrue, campaigns, &paths)
    }

    /// Claim for an account absent from the campaign's start snapshot.
    pub fn claim_new_member(
        &mut self,
        market: &Address,
        campaign: CampaignId,
        src: &Address,
        should_accrue: bool,
        proof: &NewMemberProof,
    ) -> Result<Vec<RewardClaimed>> {
        self.claim_inner(market, campaign, src, src, should_accrue, ProofPath::NewMember(proof))
    }

    /// New-member claim paid to a delegated recipient.
    pub fn claim_to_new_member(
        &mut self,
        market: &Address,
        campaign: CampaignId,
        caller: &Address,
        src: &Address,
        to: &Address,
        should_accrue: bool,
        proof: &NewMemberProof,
    ) -> Result<Vec<RewardClaimed>> {
        self.check_permission(market, caller, src, to)?;
        self.claim_inner(market, campaign, src, to, should_accrue, ProofPath::NewMember(proof))
    }

    /// New-member batch claim; membership is verified per campaign since
    /// every campaign has its own start root.
    pub fn claim_batch_new_member(
        &mut self,
        market: &Address,
        src: &Address,
        should_accrue: bool,
        campaigns: &[CampaignId],
        proofs: &[NewMemberProof],
    ) -> Result<Vec<RewardClaimed>> {
        let paths: Vec<ProofPath<'_>> = proofs.iter().map(ProofPath::NewMember).collect();
        self.claim_many(market, src, src, should_accrue, campaigns, &paths)
    }

    /// Batch variant of [`ClaimEngine::claim_to_new_member`].
    pub fn claim_to_batch_new_member(
        &mut self,
        market: &Address,
        caller: &Address,
        src: &Address,
        to: &Address,
        should_accrue: bool,
        campaigns: &[CampaignId],
        proofs: &[NewMemberProof],
    ) -> Result<Vec<RewardClaimed>> {
        self.check_permission(market, caller, src, to)?;
        let paths: Vec<ProofPath<'_>> = proofs.iter().map(ProofPath::NewMember).collect();
        self.claim_many(market, src, to, should_accrue, campaigns, &paths)
    }

    /// Read-only projection of a claim for one token.
    ///
    /// Verifies the proof and computes the accrued and still-owed amounts
    /// without touching the ledger, the tracker's accrual state, or the
    /// transfer service.
    ///
    /// # Errors
    ///
    /// - [`ClaimError::NotSupported`] if `token` is not configured for the
    ///   campaign (or carries the zero-multiplier sentinel)
    pub fn reward_owed(
        &self,
        market: &Address,
        campaign: CampaignId,
        token: &Address,
        account: &Address,
        proof: &MemberProof,
    ) -> Result<RewardOwed> {
        let entry = self.registry.campaign(market, campaign)?;
        let (start, finish) = verify_baseline(entry, account, &ProofPath::Member(proof))?;
        let config = entry.config(token).ok_or_else(|| {
            ClaimError::NotSupported(format!(
                "token {} not configured for campaign {campaign}",
                hex::encode(token)
            ))
        })?;
        let tracked_now = if entry.finish_root.is_none() {
            self.source.base_tracking_accrued(market, account)
        } else {
            0
        };
        let accrued = accrual::compute_accrued(tracked_now, start, finish, config)?;
        let claimed = self.ledger.claimed(market, campaign, account, token);
        Ok(RewardOwed { accrued, owed: accrued.saturating_sub(claimed) })
    }

    /// [`ClaimEngine::reward_owed`] over parallel campaign/proof arrays.
    pub fn reward_owed_batch(
        &self,
        market: &Address,
        token: &Address,
        account: &Address,
        campaigns: &[CampaignId],
        proofs: &[MemberProof],
    ) -> Result<Vec<RewardOwed>> {
        if campaigns.len() != proofs.len() {
            return Err(ClaimError::BadData(format!(
                "campaign/proof length mismatch: {} vs {}",
                campaigns.len(),
                proofs.len()
            )));
        }
        campaigns
            .iter()
            .zip(proofs)
            .map(|(id, proof)| self.reward_owed(market, *id, token, account, proof))
            .collect()
    }

    // ------------------------------------------------------------------
    // Administrative surface (governor-gated)
    // ------------------------------------------------------------------

    /// Register a campaign, resolving each token's rescale config from the
    /// market's accrual scale and the token's decimals.
    pub fn create_campaign(
        &mut self,
        caller: &Address,
        market: &Address,
        start_root: Hash,
        assets: &[(Address, u128)],
    ) -> Result<CampaignId> {
        let scale = self.source.base_accrual_scale(market).ok_or_else(|| {
            ClaimError::NotSupported(format!(
                "market {} has no accrual tracker",
                hex::encode(market)
            ))
        })?;

        let mut resolved = Vec::with_capacity(assets.len());
        for (token, multiplier) in assets {
            let decimals = self.transfers.decimals(token).ok_or_else(|| {
                ClaimError::NotSupported(format!("token {} has no decimals", hex::encode(token)))
            })?;
            let rescale_cfg = rescale::resolve(scale, decimals)?;
            resolved.push((*token, AssetConfig::new(*multiplier, rescale_cfg)));
        }

        let id = self.registry.create_campaign(caller, market, start_root, resolved)?;
        self.events.push(EngineEvent::CampaignCreated(CampaignCreated {
            market: *market,
            campaign: id,
            start_root,
            tokens: assets.iter().map(|(token, _)| *token).collect(),
        }));
        Ok(id)
    }

    /// Close a campaign by recording its finish root (one-way, once).
    pub fn close_campaign(
        &mut self,
        caller: &Address,
        market: &Address,
        campaign: CampaignId,
        finish_root: Hash,
    ) -> Result<()> {
        self.registry.close_campaign(caller, market, campaign, finish_root)?;
        self.events.push(EngineEvent::CampaignClosed(CampaignClosed {
            market: *market,
            campaign,
            finish_root,
        }));
        Ok(())
    }

    /// Hand the governor authority to `new_governor`.
    pub fn set_governor(&mut self, caller: &Address, new_governor: Address) -> Result<()> {
        let old = self.registry.set_governor(caller, new_governor)?;
        self.events.push(EngineEvent::GovernorTransferred(GovernorTransferred {
            old_governor: old,
            new_governor,
        }));
        Ok(())
    }

    /// Administrative override of claimed amounts, e.g. to zero out
    /// retroactive rewards before opening a campaign to claims.
    pub fn set_rewards_claimed(
        &mut self,
        caller: &Address,
        market: &Address,
        campaign: CampaignId,
        account: &Address,
        amounts: &[(Address, Amount)],
    ) -> Result<()> {
        if caller != self.registry.governor() {
            return Err(CampaignError::NotAuthorized { caller: *caller }.into());
        }
        self.registry.campaign(market, campaign)?;

        for (token, amount) in amounts {
            self.ledger.set_claimed(market, campaign, account, token, *amount);
            tracing::info!(
                market = %hex::encode(market),
                campaign,
                account = %hex::encode(account),
                token = %hex::encode(token),
                amount = %amount,
                "claimed amount overridden"
            );
            self.events.push(EngineEvent::RewardsClaimedSet(RewardsClaimedSet {
                market: *market,
                campaign,
                account: *account,
                token: *token,
                amount: *amount,
            }));
        }
        Ok(())
    }

    /// Withdraw surplus reward tokens held by the distributor.
    pub fn withdraw_token(
        &mut self,
        caller: &Address,
        token: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        if caller != self.registry.governor() {
            return Err(CampaignError::NotAuthorized { caller: *caller }.into());
        }
        if !self.transfers.transfer(token, to, amount) {
            return Err(ClaimError::TransferFailed { token: *token, recipient: *to, amount });
        }
        tracing::info!(
            token = %hex::encode(token),
            to = %hex::encode(to),
            amount = %amount,
            "surplus withdrawn"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Delegation check: `to != src` requires permission from `src`,
    /// checked once per call, never per token.
    fn check_permission(
        &self,
        market: &Address,
        caller: &Address,
        src: &Address,
        to: &Address,
    ) -> Result<()> {
        if to != src && caller != src && !self.source.has_permission(market, src, caller) {
            return Err(ClaimError::NotPermitted { src: *src, caller: *caller });
        }
        Ok(())
    }

    fn claim_inner(
        &mut self,
        market: &Address,
        campaign: CampaignId,
        src: &Address,
        to: &Address,
        should_accrue: bool,
        path: ProofPath<'_>,
    ) -> Result<Vec<RewardClaimed>> {
        self.claim_many(market, src, to, should_accrue, &[campaign], &[path])
    }

    /// The shared claim pipeline, single claims included.
    ///
    /// Staging performs no side effects: every campaign is verified and
    /// its per-token deltas computed before any value moves. Owed amounts
    /// are then aggregated per token and each token settles as a unit —
    /// one transfer paired with the ledger entries and events it covers —
    /// so paid value is always recorded and a retry can never pay the
    /// same delta twice.
    fn claim_many(
        &mut self,
        market: &Address,
        src: &Address,
        to: &Address,
        should_accrue: bool,
        campaigns: &[CampaignId],
        paths: &[ProofPath<'_>],
    ) -> Result<Vec<RewardClaimed>> {
        if campaigns.len() != paths.len() {
            return Err(ClaimError::BadData(format!(
                "campaign/proof length mismatch: {} vs {}",
                campaigns.len(),
                paths.len()
            )));
        }
        if should_accrue {
            self.source.accrue_account(market, src);
        }

        // Stage `(campaign, token, owed, accrued)` in campaign order,
        // token order within. `pending` carries accruals staged earlier
        // in this call so a campaign listed twice cannot double-count
        // its delta.
        let mut pending: BTreeMap<(CampaignId, Address), Amount> = BTreeMap::new();
        let mut staged: Vec<(CampaignId, Address, Amount, Amount)> = Vec::new();
        for (id, path) in campaigns.iter().zip(paths) {
            let entry = self.registry.campaign(market, *id)?;
            let (start, finish) = verify_baseline(entry, src, path)?;
            // Closed campaigns settle from the proven finish snapshot;
            // the live tracker is read only while open.
            let tracked_now = if entry.finish_root.is_none() {
                self.source.base_tracking_accrued(market, src)
            } else {
                0
            };
            for token in &entry.tokens {
                let Some(config) = entry.config(token) else { continue };
                let accrued = accrual::compute_accrued(tracked_now, start, finish, config)?;
                let claimed = pending
                    .get(&(*id, *token))
                    .copied()
                    .unwrap_or_else(|| self.ledger.claimed(market, *id, src, token));
                if accrued > claimed {
                    pending.insert((*id, *token), accrued);
                    staged.push((*id, *token, accrued - claimed, accrued));
                }
            }
        }

        // One payout per token for the whole call, in first-staged order.
        let mut totals: Vec<(Address, Amount)> = Vec::new();
        for (_, token, owed, _) in &staged {
            match totals.iter_mut().find(|(t, _)| t == token) {
                Some((_, total)) => {
                    *total = total.checked_add(*owed).ok_or(ClaimError::Overflow)?;
                }
                None => totals.push((*token, *owed)),
            }
        }
        // Settle token by token: the aggregated transfer first, then the
        // ledger entries and events it covers. A failed transfer aborts
        // the remaining tokens while every token already settled stays
        // both paid and recorded.
        let mut out = Vec::with_capacity(staged.len());
        for (token, amount) in &totals {
            if !self.transfers.transfer(token, to, *amount) {
                tracing::warn!(
                    token = %hex::encode(token),
                    recipient = %hex::encode(to),
                    amount = %amount,
                    "payout transfer failed"
                );
                return Err(ClaimError::TransferFailed {
                    token: *token,
                    recipient: *to,
                    amount: *amount,
                });
            }
            for (campaign, staged_token, owed, accrued) in &staged {
                if staged_token != token {
                    continue;
                }
                self.ledger.record(market, *campaign, src, token, *accrued);
                let event = RewardClaimed {
                    market: *market,
                    campaign: *campaign,
                    src: *src,
                    recipient: *to,
                    token: *token,
                    amount: *owed,
                };
                tracing::info!(
                    market = %hex::encode(market),
                    campaign = *campaign,
                    src = %hex::encode(src),
                    token = %hex::encode(token),
                    amount = %owed,
                    "reward claimed"
                );
                self.events.push(EngineEvent::RewardClaimed(event.clone()));
                out.push(event);
            }
        }
        Ok(out)
    }
}

/// Verify the claim's proofs against the campaign roots and return the
/// `(start_accrued, finish_accrued)` baseline pair for the calculator.
///
/// While a campaign is live the proof's finish fields are ignored (an
/// unverified finish value must never select the snapshot source); once a
/// finish root is set, a valid finish proof is mandatory on every path.
fn verify_baseline(
    campaign: &Campaign,
    src: &Address,
    path: &ProofPath<'_>,
) -> Result<(Amount, Amount)> {
    match path {
        ProofPath::Member(proof) => {
            let leaf = snapshot::leaf_hash(src, proof.leaf_index, proof.start_accrued);
            if !merkle::verify_proof(leaf, &proof.start_proof, &campaign.start_root) {
                return Err(ClaimError::InvalidProof { kind: "start", account: *src });
            }
            match campaign.finish_root {
                Some(finish_root) => {
                    if proof.finish_proof.is_empty() {
                        return Err(ClaimError::InvalidProof { kind: "finish", account: *src });
                    }
                    let leaf =
                        snapshot::leaf_hash(src, proof.leaf_index, proof.finish_accrued);
                    if !merkle::verify_proof(leaf, &proof.finish_proof, &finish_root) {
                        return Err(ClaimError::InvalidProof { kind: "finish", account: *src });
                    }
                    Ok((proof.start_accrued, proof.finish_accrued))
                }
                None => Ok((proof.start_accrued, 0)),
            }
        }
        ProofPath::NewMember(proof) => {
            membership::verify_new_member(src, &campaign.start_root, &proof.left, &proof.right)?;
            match campaign.finish_root {
                Some(finish_root) => {
                    let finish = proof
                        .finish
                        .as_ref()
                        .ok_or(ClaimError::InvalidProof { kind: "finish", account: *src })?;
                    let leaf =
                        snapshot::leaf_hash(src, finish.leaf_index, finish.finish_accrued);
                    if !merkle::verify_proof(leaf, &finish.proof, &finish_root) {
                        return Err(ClaimError::InvalidProof { kind: "finish", account: *src });
                    }
                    Ok((0, finish.finish_accrued))
                }
                None => Ok((0, 0)),
            }
        }
    }
}
