//! Claims Domain Ports
//!
//! The engine reads and writes claims through the [`ClaimRepository`] port so
//! that the storage collaborator can be swapped without touching workflow
//! logic.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_claims::ports::memory::InMemoryClaimRepository;
//! use std::sync::Arc;
//!
//! let repository = Arc::new(InMemoryClaimRepository::new());
//! let engine = ClaimsEngine::new(repository, EngineConfig::default());
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{ClaimId, ClientId, DomainPort, HealthCheckable, PolicyId, PortError};

use crate::claim::{Claim, ClaimStatus};
use crate::reserve::ReserveAdjustment;
use crate::scoring::RiskBand;
use crate::workflow::WorkflowTier;

/// Query parameters for finding claims
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimQuery {
    /// Filter by exact status
    pub status: Option<ClaimStatus>,
    /// Only claims awaiting a decision
    pub pending_only: bool,
    /// Filter by current tier
    pub tier: Option<WorkflowTier>,
    pub policy_id: Option<PolicyId>,
    pub client_id: Option<ClientId>,
    pub risk_band: Option<RiskBand>,
    /// Only claims submitted strictly before this instant
    pub submitted_before: Option<DateTime<Utc>>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl ClaimQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_status(status: ClaimStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Claims still waiting in an approval queue
    pub fn pending() -> Self {
        Self {
            pending_only: true,
            ..Default::default()
        }
    }

    pub fn by_client(client_id: ClientId) -> Self {
        Self {
            client_id: Some(client_id),
            ..Default::default()
        }
    }

    pub fn by_policy(policy_id: PolicyId) -> Self {
        Self {
            policy_id: Some(policy_id),
            ..Default::default()
        }
    }

    pub fn with_tier(mut self, tier: WorkflowTier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_risk_band(mut self, band: RiskBand) -> Self {
        self.risk_band = Some(band);
        self
    }

    /// Restricts to claims submitted before `instant`, giving an as-of view
    pub fn submitted_before(mut self, instant: DateTime<Utc>) -> Self {
        self.submitted_before = Some(instant);
        self
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// True if the claim passes every filter (pagination aside)
    pub fn matches(&self, claim: &Claim) -> bool {
        self.status.map_or(true, |s| claim.status == s)
            && (!self.pending_only || claim.is_pending())
            && self.tier.map_or(true, |t| claim.tier == t)
            && self.policy_id.map_or(true, |p| claim.policy_id() == p)
            && self.client_id.map_or(true, |c| claim.client_id() == c)
            && self.risk_band.map_or(true, |b| claim.risk_band() == b)
            && self
                .submitted_before
                .map_or(true, |at| claim.submission.submitted_at < at)
    }
}

/// Storage port for claims and the reserve adjustment ledger
///
/// Implementations store whole records. A reader never observes a claim
/// half-way through a transition.
#[async_trait]
pub trait ClaimRepository: DomainPort + HealthCheckable {
    /// Gets a claim by id
    async fn get(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// Lists claims matching the query, oldest first
    async fn list(&self, query: &ClaimQuery) -> Result<Vec<Claim>, PortError>;

    /// Stores a new claim
    ///
    /// # Errors
    ///
    /// `PortError::Duplicate` if a claim with the same id exists.
    async fn insert(&self, claim: Claim) -> Result<Claim, PortError>;

    /// Replaces a stored claim if its version still equals `expected_version`
    ///
    /// Returns the stored record with its version bumped.
    ///
    /// # Errors
    ///
    /// * `PortError::NotFound` if the claim does not exist
    /// * `PortError::Conflict` if another writer got there first
    /// * `PortError::Validation` if the update would drop approval history
    async fn update(&self, claim: Claim, expected_version: u64) -> Result<Claim, PortError>;

    /// Number of claims on record for a client
    async fn count_by_client(&self, client_id: ClientId) -> Result<u32, PortError>;

    /// Appends to the reserve adjustment ledger
    async fn append_adjustment(
        &self,
        adjustment: ReserveAdjustment,
    ) -> Result<ReserveAdjustment, PortError>;

    /// Lists ledger entries, optionally for one claim, oldest first
    async fn list_adjustments(
        &self,
        claim_id: Option<ClaimId>,
    ) -> Result<Vec<ReserveAdjustment>, PortError>;
}

pub mod memory {
    //! In-memory claim store

    use super::*;
    use core_kernel::HealthCheckResult;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use tracing::{debug, instrument};

    const ENTITY: &str = "Claim";

    /// In-memory implementation of [`ClaimRepository`]
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryClaimRepository {
        claims: Arc<RwLock<HashMap<ClaimId, Claim>>>,
        adjustments: Arc<RwLock<Vec<ReserveAdjustment>>>,
    }

    impl InMemoryClaimRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store
        pub async fn with_claims(claims: Vec<Claim>) -> Self {
            let repository = Self::new();
            {
                let mut store = repository.claims.write().await;
                for claim in claims {
                    store.insert(claim.id, claim);
                }
            }
            repository
        }

        pub async fn len(&self) -> usize {
            self.claims.read().await.len()
        }
    }

    impl DomainPort for InMemoryClaimRepository {}

    #[async_trait]
    impl HealthCheckable for InMemoryClaimRepository {
        async fn health_check(&self) -> HealthCheckResult {
            let count = self.claims.read().await.len();
            HealthCheckResult::healthy("in-memory-claims")
                .with_message(format!("{} claims on record", count))
        }
    }

    #[async_trait]
    impl ClaimRepository for InMemoryClaimRepository {
        #[instrument(skip(self), fields(claim_id = %id))]
        async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.claims
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found(ENTITY, id))
        }

        #[instrument(skip(self, query))]
        async fn list(&self, query: &ClaimQuery) -> Result<Vec<Claim>, PortError> {
            let store = self.claims.read().await;
            let mut claims: Vec<Claim> = store
                .values()
                .filter(|c| query.matches(c))
                .cloned()
                .collect();
            drop(store);

            claims.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

            let offset = query.offset.unwrap_or(0) as usize;
            let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
            let page: Vec<Claim> = claims.into_iter().skip(offset).take(limit).collect();

            debug!(returned = page.len(), "Listed claims");
            Ok(page)
        }

        #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
        async fn insert(&self, claim: Claim) -> Result<Claim, PortError> {
            let mut store = self.claims.write().await;
            if store.contains_key(&claim.id) {
                return Err(PortError::duplicate(ENTITY, claim.id));
            }
            store.insert(claim.id, claim.clone());
            debug!(version = claim.version, "Inserted claim");
            Ok(claim)
        }

        #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
        async fn update(&self, mut claim: Claim, expected_version: u64) -> Result<Claim, PortError> {
            let mut store = self.claims.write().await;
            let stored = store
                .get(&claim.id)
                .ok_or_else(|| PortError::not_found(ENTITY, claim.id))?;

            if stored.version != expected_version {
                return Err(PortError::conflict(
                    ENTITY,
                    claim.id,
                    expected_version,
                    stored.version,
                ));
            }
            if !claim.approval_history.extends(&stored.approval_history) {
                return Err(PortError::validation(format!(
                    "update of claim {} would drop approval history",
                    claim.id
                )));
            }

            claim.version = expected_version + 1;
            store.insert(claim.id, claim.clone());
            debug!(version = claim.version, status = %claim.status, "Updated claim");
            Ok(claim)
        }

        async fn count_by_client(&self, client_id: ClientId) -> Result<u32, PortError> {
            let count = self
                .claims
                .read()
                .await
                .values()
                .filter(|c| c.client_id() == client_id)
                .count();
            Ok(u32::try_from(count).unwrap_or(u32::MAX))
        }

        #[instrument(skip(self, adjustment), fields(claim_id = %adjustment.claim_id))]
        async fn append_adjustment(
            &self,
            adjustment: ReserveAdjustment,
        ) -> Result<ReserveAdjustment, PortError> {
            if !self.claims.read().await.contains_key(&adjustment.claim_id) {
                return Err(PortError::not_found(ENTITY, adjustment.claim_id));
            }
            self.adjustments.write().await.push(adjustment.clone());
            debug!(adjustment_id = %adjustment.id, "Appended reserve adjustment");
            Ok(adjustment)
        }

        async fn list_adjustments(
            &self,
            claim_id: Option<ClaimId>,
        ) -> Result<Vec<ReserveAdjustment>, PortError> {
            Ok(self
                .adjustments
                .read()
                .await
                .iter()
                .filter(|a| claim_id.map_or(true, |id| a.claim_id == id))
                .cloned()
                .collect())
        }
    }

}
