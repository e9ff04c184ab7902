//! Claim submissions as handed over by the intake collaborator

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, Currency, Money, PolicyId};
use crate::error::ClaimError;

/// Descriptions shorter than this are treated as insufficient
pub const MIN_DESCRIPTION_CHARS: usize = 20;

/// Largest amount a single claim may request
///
/// Keeps loaded reserves and book-wide totals well inside `Decimal` range.
pub const MAX_CLAIM_AMOUNT: Decimal = dec!(1000000000000);

/// A raw claim submission
///
/// Immutable once accepted; a resubmission with different data produces a new
/// claim and a new risk assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSubmission {
    /// Policy the claim is filed against
    pub policy_id: PolicyId,
    /// Claimant
    pub client_id: ClientId,
    /// Date of the incident, if the claimant supplied one
    pub incident_date: Option<NaiveDate>,
    /// Free-text incident description
    pub description: Option<String>,
    /// Amount requested by the claimant
    pub amount_requested: Money,
    /// Number of supporting photos attached
    pub photo_count: Option<u32>,
    /// Prior claims for this client as reported by intake
    pub prior_claims: u32,
    /// Inception date of the policy, when intake knows it
    pub policy_start_date: Option<NaiveDate>,
    /// When the claim was filed
    pub submitted_at: DateTime<Utc>,
}

impl ClaimSubmission {
    /// Creates a submission filed now with no optional evidence attached
    pub fn new(policy_id: PolicyId, client_id: ClientId, amount_requested: Money) -> Self {
        Self {
            policy_id,
            client_id,
            incident_date: None,
            description: None,
            amount_requested,
            photo_count: None,
            prior_claims: 0,
            policy_start_date: None,
            submitted_at: Utc::now(),
        }
    }

    pub fn with_incident_date(mut self, date: NaiveDate) -> Self {
        self.incident_date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_photos(mut self, count: u32) -> Self {
        self.photo_count = Some(count);
        self
    }

    pub fn with_prior_claims(mut self, count: u32) -> Self {
        self.prior_claims = count;
        self
    }

    pub fn with_policy_start_date(mut self, date: NaiveDate) -> Self {
        self.policy_start_date = Some(date);
        self
    }

    pub fn submitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = at;
        self
    }

    /// Date the claim was filed
    pub fn claim_date(&self) -> NaiveDate {
        self.submitted_at.date_naive()
    }

    pub fn has_photos(&self) -> bool {
        self.photo_count.unwrap_or(0) > 0
    }

    /// True when the description is missing or too short to be useful
    ///
    /// Length is counted on the text as received, whitespace included.
    pub fn has_insufficient_description(&self) -> bool {
        self.description
            .as_deref()
            .map(|d| d.chars().count() < MIN_DESCRIPTION_CHARS)
            .unwrap_or(true)
    }

    /// Whole days between the incident and the filing, if the incident date is known
    ///
    /// Negative for incident dates after the filing date.
    pub fn days_since_incident(&self) -> Option<i64> {
        self.incident_date
            .map(|incident| (self.claim_date() - incident).num_days())
    }

    /// Validates the submission before any claim state is created
    ///
    /// # Arguments
    ///
    /// * `currency` - The claim book currency the amount must be expressed in
    pub fn validate(&self, currency: Currency) -> Result<(), ClaimError> {
        if self.policy_id.is_nil() {
            return Err(ClaimError::validation("policy reference is required"));
        }
        if self.client_id.is_nil() {
            return Err(ClaimError::validation("client reference is required"));
        }
        if self.amount_requested.is_negative() {
            return Err(ClaimError::validation(format!(
                "requested amount must not be negative, got {}",
                self.amount_requested
            )));
        }
        if self.amount_requested.amount() > MAX_CLAIM_AMOUNT {
            return Err(ClaimError::validation(format!(
                "requested amount must not exceed {}, got {}",
                MAX_CLAIM_AMOUNT, self.amount_requested
            )));
        }
        if self.amount_requested.currency() != currency {
            return Err(ClaimError::validation(format!(
                "requested amount must be in {}, got {}",
                currency,
                self.amount_requested.currency()
            )));
        }
        Ok(())
    }
}
