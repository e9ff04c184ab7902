//! Claims DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use core_kernel::{ClientId, Currency, Money, PolicyId};
use domain_claims::{
    ApprovalLog, ApproverRole, Claim, ClaimError, ClaimQuery, ClaimStatus, ClaimSubmission,
    Decision, RiskBand, RiskFactors, RiskFlag, WorkflowTier, MAX_CLAIM_AMOUNT,
};

pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.message = Some("must not be negative".into());
        return Err(error);
    }
    Ok(())
}

pub(crate) fn validate_claim_amount(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(value)?;
    if *value > MAX_CLAIM_AMOUNT {
        let mut error = ValidationError::new("max_claim_amount");
        error.message = Some(format!("must not exceed {}", MAX_CLAIM_AMOUNT).into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitClaimRequest {
    pub policy_id: Uuid,
    pub client_id: Uuid,
    pub incident_date: Option<NaiveDate>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_claim_amount"))]
    pub amount_requested: Decimal,
    /// Defaults to the book currency
    pub currency: Option<Currency>,
    #[validate(range(max = 1000))]
    pub photo_count: Option<u32>,
    #[validate(range(max = 10000))]
    pub prior_claims: Option<u32>,
    pub policy_start_date: Option<NaiveDate>,
    /// Defaults to the time the request is received
    pub submitted_at: Option<DateTime<Utc>>,
}

impl SubmitClaimRequest {
    pub fn into_submission(self, book_currency: Currency) -> ClaimSubmission {
        let currency = self.currency.unwrap_or(book_currency);
        ClaimSubmission {
            policy_id: PolicyId::from_uuid(self.policy_id),
            client_id: ClientId::from_uuid(self.client_id),
            incident_date: self.incident_date,
            description: self.description,
            amount_requested: Money::new(self.amount_requested, currency),
            photo_count: self.photo_count,
            prior_claims: self.prior_claims.unwrap_or(0),
            policy_start_date: self.policy_start_date,
            submitted_at: self.submitted_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Approve,
    Deny,
    Escalate,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    pub action: DecisionAction,
    /// Approver role wire name, e.g. `L2_APPROVER`
    #[validate(length(min = 1, max = 32))]
    pub role: String,
    #[validate(length(max = 2000))]
    pub reason: String,
    /// Only meaningful for approvals; defaults to the requested amount
    pub approved_amount: Option<Decimal>,
}

impl DecisionRequest {
    pub fn role(&self) -> Result<ApproverRole, ClaimError> {
        self.role.parse()
    }

    pub fn decision(&self, currency: Currency) -> Decision {
        match self.action {
            DecisionAction::Approve => Decision::Approve {
                amount: self.approved_amount.map(|a| Money::new(a, currency)),
            },
            DecisionAction::Deny => Decision::Deny,
            DecisionAction::Escalate => Decision::Escalate,
        }
    }
}

/// Query string filters shared by claim listing and reserve snapshots
#[derive(Debug, Default, Deserialize)]
pub struct ClaimFilterParams {
    pub status: Option<ClaimStatus>,
    pub pending_only: Option<bool>,
    pub tier: Option<WorkflowTier>,
    pub policy_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub risk_band: Option<RiskBand>,
    pub submitted_before: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ClaimFilterParams {
    pub fn into_query(self) -> ClaimQuery {
        ClaimQuery {
            status: self.status,
            pending_only: self.pending_only.unwrap_or(false),
            tier: self.tier,
            policy_id: self.policy_id.map(PolicyId::from_uuid),
            client_id: self.client_id.map(ClientId::from_uuid),
            risk_band: self.risk_band,
            submitted_before: self.submitted_before,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub client_id: Uuid,
    pub status: ClaimStatus,
    pub tier: WorkflowTier,
    pub currency: Currency,
    pub amount_requested: Decimal,
    pub amount_approved: Decimal,
    pub reserve_amount: Decimal,
    pub fraud_score: u8,
    pub confidence_level: u8,
    pub risk_band: RiskBand,
    pub risk_label: String,
    pub flags: Vec<RiskFlag>,
    pub factors: RiskFactors,
    pub incident_date: Option<NaiveDate>,
    pub submitted_at: DateTime<Utc>,
    pub approval_history: ApprovalLog,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        let risk_band = claim.risk_band();
        let risk_label = claim.assessment.risk_label().to_string();
        Self {
            id: *claim.id.as_uuid(),
            policy_id: *claim.policy_id().as_uuid(),
            client_id: *claim.client_id().as_uuid(),
            status: claim.status,
            tier: claim.tier,
            currency: claim.currency(),
            amount_requested: claim.amount_requested().amount(),
            amount_approved: claim.amount_approved.amount(),
            reserve_amount: claim.reserve_amount.amount(),
            fraud_score: claim.assessment.fraud_score,
            confidence_level: claim.assessment.confidence_level,
            risk_band,
            risk_label,
            flags: claim.assessment.flags,
            factors: claim.assessment.factors,
            incident_date: claim.submission.incident_date,
            submitted_at: claim.submission.submitted_at,
            approval_history: claim.approval_history,
            version: claim.version,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}
