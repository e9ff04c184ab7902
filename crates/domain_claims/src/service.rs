//! Claims engine
//!
//! Orchestrates scoring, routing, approval decisions and reserving on top of
//! an injected [`ClaimRepository`].
//!
//! Decisions on the same claim are serialised through a per-claim lock, so
//! of two concurrent decisions exactly one applies and the other observes
//! the result. Decisions on different claims never wait on each other.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use core_kernel::{ClaimId, ClientId, Currency, HealthCheckResult, Money};

use crate::claim::{Claim, ClaimStatus, Decision};
use crate::error::{require_reason, ClaimError};
use crate::ports::{ClaimQuery, ClaimRepository};
use crate::reserve::{AdjustmentType, ReserveAdjustment, ReserveAdjustmentStats, ReserveSnapshot};
use crate::scoring::assess;
use crate::submission::ClaimSubmission;
use crate::workflow::{ApproverRole, WorkflowTier};

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Currency of the claim book; submissions in any other currency are rejected
    pub currency: Currency,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency: Currency::USD,
        }
    }
}

/// Claim counts per approval queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    /// Every status is present, zero when empty
    pub by_status: BTreeMap<ClaimStatus, usize>,
    pub pending: usize,
    pub total: usize,
}

impl QueueSummary {
    pub fn from_claims(claims: &[Claim]) -> Self {
        let mut by_status: BTreeMap<ClaimStatus, usize> =
            ClaimStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for claim in claims {
            *by_status.entry(claim.status).or_insert(0) += 1;
        }
        let pending = claims.iter().filter(|c| c.is_pending()).count();

        Self {
            by_status,
            pending,
            total: claims.len(),
        }
    }

    /// Claims waiting at a tier
    pub fn waiting_at(&self, tier: WorkflowTier) -> usize {
        self.by_status
            .get(&ClaimStatus::pending(tier))
            .copied()
            .unwrap_or(0)
    }
}

/// Service for the claim approval workflow
pub struct ClaimsEngine {
    repository: Arc<dyn ClaimRepository>,
    config: EngineConfig,
    /// Per-claim decision mutexes; entries die with their last holder
    locks: Mutex<HashMap<ClaimId, Weak<Mutex<()>>>>,
}

impl ClaimsEngine {
    pub fn new(repository: Arc<dyn ClaimRepository>, config: EngineConfig) -> Self {
        Self {
            repository,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scores, routes and stores a new claim
    ///
    /// # Arguments
    ///
    /// * `submission` - The claim as received from intake
    /// * `history_count` - Claims already on record for the claimant
    ///
    /// # Returns
    ///
    /// The stored claim, pending at its initial tier with its reserve set
    ///
    /// # Errors
    ///
    /// `Validation` for a nil policy or client reference, a negative amount,
    /// an amount above [`MAX_CLAIM_AMOUNT`](crate::MAX_CLAIM_AMOUNT), or an
    /// amount outside the book currency. Nothing is stored on error.
    #[instrument(
        skip(self, submission),
        fields(policy_id = %submission.policy_id, client_id = %submission.client_id)
    )]
    pub async fn submit_claim(
        &self,
        submission: ClaimSubmission,
        history_count: u32,
    ) -> Result<Claim, ClaimError> {
        if let Err(error) = submission.validate(self.config.currency) {
            warn!(%error, "Rejected claim submission");
            return Err(error);
        }

        let assessment = assess(&submission, history_count);
        let claim = Claim::open(submission, assessment)?;
        let claim = self.repository.insert(claim).await?;

        info!(
            claim_id = %claim.id,
            fraud_score = claim.assessment.fraud_score,
            confidence = claim.assessment.confidence_level,
            tier = %claim.tier,
            reserve = %claim.reserve_amount,
            "Claim submitted"
        );
        Ok(claim)
    }

    /// Applies an approver's decision to a claim
    ///
    /// # Errors
    ///
    /// Checked in order: `MissingReason`, `NotFound`, `Unauthorized`,
    /// `InvalidTransition`, `Validation`. The stored claim is unchanged on
    /// any error.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let claim = engine
    ///     .decide_claim(id, Decision::Escalate, ApproverRole::L1Approver, "Needs L2 sign-off")
    ///     .await?;
    /// assert_eq!(claim.status, ClaimStatus::PendingL2);
    /// ```
    #[instrument(skip(self, decision, role, reason), fields(claim_id = %id, action = decision.verb(), role = %role))]
    pub async fn decide_claim(
        &self,
        id: ClaimId,
        decision: Decision,
        role: ApproverRole,
        reason: &str,
    ) -> Result<Claim, ClaimError> {
        if let Err(error) = require_reason(decision.verb(), reason) {
            warn!(%error, "Rejected decision");
            return Err(error);
        }

        self.repository
            .get(id)
            .await
            .map_err(|e| ClaimError::from_port(id, e))?;

        let lock = self.claim_lock(id).await;
        let _guard = lock.lock().await;

        let current = self
            .repository
            .get(id)
            .await
            .map_err(|e| ClaimError::from_port(id, e))?;

        let mut updated = current.clone();
        if let Err(error) = updated.apply(&decision, role, reason) {
            warn!(%error, status = %current.status, tier = %current.tier, "Rejected decision");
            return Err(error);
        }

        let stored = self
            .repository
            .update(updated, current.version)
            .await
            .map_err(|e| ClaimError::from_port(id, e))?;

        info!(
            status = %stored.status,
            tier = %stored.tier,
            approved = %stored.amount_approved,
            reserve = %stored.reserve_amount,
            "Decision applied"
        );
        Ok(stored)
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    pub async fn get_claim(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        self.repository
            .get(id)
            .await
            .map_err(|e| ClaimError::from_port(id, e))
    }

    pub async fn list_claims(&self, query: &ClaimQuery) -> Result<Vec<Claim>, ClaimError> {
        Ok(self.repository.list(query).await?)
    }

    /// Aggregates stored reserves, optionally over a filtered subset
    ///
    /// Pagination on the query is ignored; the snapshot always covers every
    /// matching claim.
    #[instrument(skip(self, query))]
    pub async fn reserve_snapshot(
        &self,
        query: Option<ClaimQuery>,
    ) -> Result<ReserveSnapshot, ClaimError> {
        let mut query = query.unwrap_or_default();
        query.limit = None;
        query.offset = None;

        let claims = self.repository.list(&query).await?;
        let snapshot = ReserveSnapshot::from_claims(&claims, self.config.currency)?;
        info!(claims = snapshot.claim_count, total = %snapshot.total, "Reserve snapshot");
        Ok(snapshot)
    }

    /// History count used for scoring a new claim from `client_id`
    ///
    /// The larger of the count reported by intake and the claims on record.
    pub async fn claimant_history(
        &self,
        client_id: ClientId,
        reported_prior_claims: u32,
    ) -> Result<u32, ClaimError> {
        let on_record = self.repository.count_by_client(client_id).await?;
        Ok(reported_prior_claims.max(on_record))
    }

    pub async fn queue_summary(&self) -> Result<QueueSummary, ClaimError> {
        let claims = self.repository.list(&ClaimQuery::all()).await?;
        Ok(QueueSummary::from_claims(&claims))
    }

    /// Records a manual reserve adjustment against a claim
    ///
    /// The adjustment is an audit entry; the claim's derived reserve is not
    /// changed.
    ///
    /// # Errors
    ///
    /// `MissingReason` for a blank reason, `NotFound` for an unknown claim,
    /// `Validation` for a bad amount or missing adjuster.
    #[instrument(skip(self, amount, reason, adjusted_by), fields(claim_id = %claim_id, adjusted_by = %adjusted_by))]
    pub async fn adjust_reserve(
        &self,
        claim_id: ClaimId,
        adjustment_type: AdjustmentType,
        amount: Money,
        reason: &str,
        adjusted_by: &str,
    ) -> Result<ReserveAdjustment, ClaimError> {
        require_reason("adjust the reserve of", reason)?;

        self.repository
            .get(claim_id)
            .await
            .map_err(|e| ClaimError::from_port(claim_id, e))?;

        let lock = self.claim_lock(claim_id).await;
        let _guard = lock.lock().await;

        let claim = self
            .repository
            .get(claim_id)
            .await
            .map_err(|e| ClaimError::from_port(claim_id, e))?;
        let adjustment = ReserveAdjustment::new(&claim, adjustment_type, amount, reason, adjusted_by)?;
        let adjustment = self
            .repository
            .append_adjustment(adjustment)
            .await
            .map_err(|e| ClaimError::from_port(claim_id, e))?;

        info!(
            adjustment_id = %adjustment.id,
            previous = %adjustment.previous_reserve,
            new = %adjustment.new_reserve,
            "Reserve adjustment recorded"
        );
        Ok(adjustment)
    }

    pub async fn reserve_adjustments(
        &self,
        claim_id: Option<ClaimId>,
    ) -> Result<Vec<ReserveAdjustment>, ClaimError> {
        Ok(self.repository.list_adjustments(claim_id).await?)
    }

    pub async fn adjustment_statistics(&self) -> Result<ReserveAdjustmentStats, ClaimError> {
        let ledger = self.repository.list_adjustments(None).await?;
        Ok(ReserveAdjustmentStats::from_adjustments(&ledger, self.config.currency)?)
    }

    pub async fn health(&self) -> HealthCheckResult {
        self.repository.health_check().await
    }

    async fn claim_lock(&self, id: ClaimId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| lock.strong_count() > 0);
        if let Some(lock) = locks.get(&id).and_then(Weak::upgrade) {
            return lock;
        }
        let lock = Arc::new(Mutex::new(()));
        locks.insert(id, Arc::downgrade(&lock));
        lock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::memory::InMemoryClaimRepository;
    use core_kernel::PolicyId;
    use rust_decimal_macros::dec;

    fn engine() -> ClaimsEngine {
        ClaimsEngine::new(Arc::new(InMemoryClaimRepository::new()), EngineConfig::default())
    }

    fn submission(amount: rust_decimal::Decimal) -> ClaimSubmission {
        ClaimSubmission::new(PolicyId::new_v7(), ClientId::new_v7(), Money::usd(amount))
            .with_description("Storm blew a tree onto the garage roof")
            .with_photos(3)
    }

    #[tokio::test]
    async fn test_submit_and_get() {
        let engine = engine();
        let claim = engine.submit_claim(submission(dec!(1500)), 0).await.unwrap();
        let fetched = engine.get_claim(claim.id).await.unwrap();
        assert_eq!(fetched, claim);
    }

    #[tokio::test]
    async fn test_submit_rejects_foreign_currency() {
        let engine = engine();
        let mut s = submission(dec!(1500));
        s.amount_requested = Money::new(dec!(1500), Currency::GBP);
        assert!(matches!(engine.submit_claim(s, 0).await, Err(ClaimError::Validation(_))));
        assert_eq!(engine.queue_summary().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_missing_reason_precedes_not_found() {
        let engine = engine();
        let err = engine
            .decide_claim(ClaimId::new_v7(), Decision::Deny, ApproverRole::L3Approver, "")
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::MissingReason(_)));

        let err = engine
            .decide_claim(ClaimId::new_v7(), Decision::Deny, ApproverRole::L3Approver, "fraud")
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_claims_leave_no_lock_entries() {
        let engine = engine();
        for _ in 0..1000 {
            let err = engine
                .decide_claim(ClaimId::new_v7(), Decision::Deny, ApproverRole::L3Approver, "fraud")
                .await
                .unwrap_err();
            assert!(matches!(err, ClaimError::NotFound(_)));
        }
        let err = engine
            .adjust_reserve(
                ClaimId::new_v7(),
                AdjustmentType::Increase,
                Money::usd(dec!(10)),
                "Legal fees",
                "reserving-team",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::NotFound(_)));
        assert_eq!(engine.locks.lock().await.len(), 0);
    }

    #[tokio::test]
    async fn test_lock_entries_are_released_after_decisions() {
        let engine = engine();
        for _ in 0..10 {
            let claim = engine.submit_claim(submission(dec!(1500)), 0).await.unwrap();
            engine
                .decide_claim(claim.id, Decision::approve(), ApproverRole::L1Approver, "Receipts match")
                .await
                .unwrap();
        }

        let locks = engine.locks.lock().await;
        assert!(locks.len() <= 1);
        assert!(locks.values().all(|lock| lock.strong_count() == 0));
    }

    #[tokio::test]
    async fn test_oversized_submission_is_not_stored() {
        let engine = engine();
        let err = engine
            .submit_claim(submission(crate::MAX_CLAIM_AMOUNT + dec!(1)), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Validation(_)));
        assert_eq!(engine.queue_summary().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_decision_bumps_version() {
        let engine = engine();
        let claim = engine.submit_claim(submission(dec!(1500)), 0).await.unwrap();
        let decided = engine
            .decide_claim(claim.id, Decision::approve(), ApproverRole::L1Approver, "Receipts match")
            .await
            .unwrap();
        assert_eq!(decided.version, claim.version + 1);
        assert_eq!(decided.status, ClaimStatus::Approved);
    }

    #[tokio::test]
    async fn test_claimant_history_takes_larger_count() {
        let engine = engine();
        let s = submission(dec!(500));
        let client = s.client_id;
        engine.submit_claim(s.clone(), 0).await.unwrap();
        engine.submit_claim(s, 0).await.unwrap();

        assert_eq!(engine.claimant_history(client, 0).await.unwrap(), 2);
        assert_eq!(engine.claimant_history(client, 5).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_queue_summary_counts_every_status() {
        let engine = engine();
        engine.submit_claim(submission(dec!(500)), 0).await.unwrap();
        engine.submit_claim(submission(dec!(25000.50)), 0).await.unwrap();

        let summary = engine.queue_summary().await.unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.by_status.len(), 5);
        assert_eq!(summary.waiting_at(WorkflowTier::L2), 1);
    }

    #[tokio::test]
    async fn test_adjustment_leaves_claim_reserve_alone() {
        let engine = engine();
        let claim = engine.submit_claim(submission(dec!(1000)), 0).await.unwrap();
        let adjustment = engine
            .adjust_reserve(
                claim.id,
                AdjustmentType::Increase,
                Money::usd(dec!(250)),
                "Legal fees expected",
                "reserving-team",
            )
            .await
            .unwrap();

        assert_eq!(adjustment.previous_reserve, claim.reserve_amount);
        assert_eq!(adjustment.new_reserve, Money::usd(dec!(1250)));
        assert_eq!(engine.get_claim(claim.id).await.unwrap().reserve_amount, claim.reserve_amount);
        assert_eq!(engine.reserve_adjustments(Some(claim.id)).await.unwrap().len(), 1);
        assert_eq!(engine.adjustment_statistics().await.unwrap().increases, 1);
    }
}
