//! Claim aggregate and the approval state machine
//!
//! ```text
//!              escalate          escalate
//! Pending L1 ----------> Pending L2 ----------> Pending L3
//!     |                      |                      |
//!     +----------------------+----------------------+--> Approved | Denied
//! ```
//!
//! Every transition validates everything first and only then mutates, so a
//! failed decision leaves the claim exactly as it was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ClaimId, ClientId, Currency, Money, PolicyId};
use crate::approval::{ApprovalAction, ApprovalLog, ApprovalRecord};
use crate::error::{require_reason, ClaimError};
use crate::reserve::{calculate_reserve, claim_reserve};
use crate::scoring::{RiskAssessment, RiskBand};
use crate::submission::ClaimSubmission;
use crate::workflow::{route_initial_tier, ApproverRole, WorkflowTier};

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    #[serde(rename = "Pending L1")]
    PendingL1,
    #[serde(rename = "Pending L2")]
    PendingL2,
    #[serde(rename = "Pending L3")]
    PendingL3,
    Approved,
    Denied,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 5] = [
        ClaimStatus::PendingL1,
        ClaimStatus::PendingL2,
        ClaimStatus::PendingL3,
        ClaimStatus::Approved,
        ClaimStatus::Denied,
    ];

    /// The pending status matching a tier
    pub fn pending(tier: WorkflowTier) -> Self {
        match tier {
            WorkflowTier::L1 => ClaimStatus::PendingL1,
            WorkflowTier::L2 => ClaimStatus::PendingL2,
            WorkflowTier::L3 => ClaimStatus::PendingL3,
        }
    }

    /// The tier a pending status waits at; `None` for terminal statuses
    pub fn tier(&self) -> Option<WorkflowTier> {
        match self {
            ClaimStatus::PendingL1 => Some(WorkflowTier::L1),
            ClaimStatus::PendingL2 => Some(WorkflowTier::L2),
            ClaimStatus::PendingL3 => Some(WorkflowTier::L3),
            ClaimStatus::Approved | ClaimStatus::Denied => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.tier().is_some()
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::PendingL1 => "Pending L1",
            ClaimStatus::PendingL2 => "Pending L2",
            ClaimStatus::PendingL3 => "Pending L3",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Denied => "Denied",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision an approver can take on a pending claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Decision {
    /// Settle the claim; the amount defaults to the requested amount
    Approve {
        #[serde(default)]
        amount: Option<Money>,
    },
    Deny,
    /// Hand the claim to the next tier
    Escalate,
}

impl Decision {
    pub fn approve() -> Self {
        Decision::Approve { amount: None }
    }

    pub fn approve_amount(amount: Money) -> Self {
        Decision::Approve { amount: Some(amount) }
    }

    /// Verb used in error messages
    pub fn verb(&self) -> &'static str {
        match self {
            Decision::Approve { .. } => "approve",
            Decision::Deny => "deny",
            Decision::Escalate => "escalate",
        }
    }

    fn action(&self) -> ApprovalAction {
        match self {
            Decision::Approve { .. } => ApprovalAction::Approved,
            Decision::Deny => ApprovalAction::Denied,
            Decision::Escalate => ApprovalAction::Escalated,
        }
    }
}

/// A claim moving through the approval workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub submission: ClaimSubmission,
    pub assessment: RiskAssessment,
    /// Current approval tier; never moves down
    pub tier: WorkflowTier,
    pub status: ClaimStatus,
    /// Zero until the claim is approved
    pub amount_approved: Money,
    /// Derived from status, amounts and fraud score
    pub reserve_amount: Money,
    pub approval_history: ApprovalLog,
    /// Optimistic concurrency counter, bumped on every persisted change
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Opens a claim for an assessed submission
    ///
    /// The claim starts pending at the tier routed from the requested amount
    /// and the fraud score, with its initial reserve already set.
    ///
    /// # Errors
    ///
    /// `Validation` when the loaded reserve overflows.
    pub fn open(submission: ClaimSubmission, assessment: RiskAssessment) -> Result<Self, ClaimError> {
        let now = Utc::now();
        let tier = route_initial_tier(&submission.amount_requested, assessment.fraud_score);
        let currency = submission.amount_requested.currency();

        let mut claim = Self {
            id: ClaimId::new_v7(),
            submission,
            assessment,
            tier,
            status: ClaimStatus::pending(tier),
            amount_approved: Money::zero(currency),
            reserve_amount: Money::zero(currency),
            approval_history: ApprovalLog::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        };
        claim.reserve_amount = claim_reserve(&claim)?;
        Ok(claim)
    }

    pub fn policy_id(&self) -> PolicyId {
        self.submission.policy_id
    }

    pub fn client_id(&self) -> ClientId {
        self.submission.client_id
    }

    pub fn amount_requested(&self) -> Money {
        self.submission.amount_requested
    }

    pub fn currency(&self) -> Currency {
        self.submission.amount_requested.currency()
    }

    pub fn fraud_score(&self) -> u8 {
        self.assessment.fraud_score
    }

    pub fn risk_band(&self) -> RiskBand {
        self.assessment.band()
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Fails with `Unauthorized` when the role's authority is below the claim's tier
    pub fn authorize(&self, role: ApproverRole) -> Result<(), ClaimError> {
        if role.can_act_on(self.tier) {
            Ok(())
        } else {
            Err(ClaimError::Unauthorized {
                role: role.to_string(),
                tier: self.tier.to_string(),
            })
        }
    }

    /// Applies a decision
    ///
    /// # Arguments
    ///
    /// * `decision` - What the approver decided
    /// * `role` - Role of the acting approver
    /// * `reason` - Justification; must not be blank
    ///
    /// # Errors
    ///
    /// Checked in this order: `MissingReason`, `Unauthorized`,
    /// `InvalidTransition`, then `Validation` for a bad approved amount.
    /// The claim is unchanged on any error.
    pub fn apply(
        &mut self,
        decision: &Decision,
        role: ApproverRole,
        reason: &str,
    ) -> Result<(), ClaimError> {
        let reason = require_reason(decision.verb(), reason)?;
        self.authorize(role)?;
        if self.status.is_terminal() {
            return Err(self.invalid_transition(decision));
        }

        // Resolve the outcome before touching any field
        let (status, tier, approved) = match decision {
            Decision::Approve { amount } => {
                let approved = self.resolve_approved_amount(*amount)?;
                (ClaimStatus::Approved, self.tier, approved)
            }
            Decision::Deny => (ClaimStatus::Denied, self.tier, Money::zero(self.currency())),
            Decision::Escalate => {
                let next = self.tier.next().ok_or_else(|| self.invalid_transition(decision))?;
                (ClaimStatus::pending(next), next, self.amount_approved)
            }
        };
        let reserve = calculate_reserve(
            status,
            &self.submission.amount_requested,
            &approved,
            self.assessment.fraud_score,
        )?;

        let now = Utc::now();
        self.approval_history.append(ApprovalRecord {
            action: decision.action(),
            actor: role,
            tier: self.tier,
            reason,
            timestamp: now,
        });
        self.status = status;
        self.tier = tier;
        self.amount_approved = approved;
        self.reserve_amount = reserve;
        self.updated_at = now;
        Ok(())
    }

    /// Approves the claim, defaulting to the requested amount
    pub fn approve(
        &mut self,
        role: ApproverRole,
        reason: &str,
        amount: Option<Money>,
    ) -> Result<(), ClaimError> {
        self.apply(&Decision::Approve { amount }, role, reason)
    }

    pub fn deny(&mut self, role: ApproverRole, reason: &str) -> Result<(), ClaimError> {
        self.apply(&Decision::Deny, role, reason)
    }

    pub fn escalate(&mut self, role: ApproverRole, reason: &str) -> Result<(), ClaimError> {
        self.apply(&Decision::Escalate, role, reason)
    }

    /// Checks the status/tier/reserve invariants of a stored claim
    pub fn is_consistent(&self) -> bool {
        let status_matches_tier = match self.status.tier() {
            Some(tier) => tier == self.tier,
            None => true,
        };
        let approved_only_when_approved =
            self.status == ClaimStatus::Approved || self.amount_approved.is_zero();
        status_matches_tier
            && approved_only_when_approved
            && matches!(claim_reserve(self), Ok(reserve) if reserve == self.reserve_amount)
    }

    fn resolve_approved_amount(&self, amount: Option<Money>) -> Result<Money, ClaimError> {
        let amount = amount.unwrap_or_else(|| self.amount_requested());
        if amount.currency() != self.currency() {
            return Err(ClaimError::validation(format!(
                "approved amount must be in {}, got {}",
                self.currency(),
                amount.currency()
            )));
        }
        if amount.is_negative() {
            return Err(ClaimError::validation(format!(
                "approved amount must not be negative, got {}",
                amount
            )));
        }
        Ok(amount)
    }

    fn invalid_transition(&self, decision: &Decision) -> ClaimError {
        let status = if decision == &Decision::Escalate && self.is_pending() {
            format!("{} (no higher tier)", self.status)
        } else {
            self.status.to_string()
        };
        ClaimError::InvalidTransition {
            action: decision.verb().to_string(),
            status,
        }
    }
}
