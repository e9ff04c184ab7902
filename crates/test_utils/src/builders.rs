//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.
//!
//! The default submission is fully documented, filed a week after a weekday
//! incident against a mature policy, so it scores zero on every factor.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{ClientId, Money, PolicyId};
use domain_claims::{assess, Claim, ClaimSubmission};
use rust_decimal::Decimal;

use crate::fixtures::{IdFixtures, MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for constructing test claim submissions
#[derive(Debug, Clone)]
pub struct TestSubmissionBuilder {
    policy_id: PolicyId,
    client_id: ClientId,
    amount: Money,
    description: Option<String>,
    photo_count: Option<u32>,
    incident_date: Option<NaiveDate>,
    prior_claims: u32,
    policy_start_date: Option<NaiveDate>,
    submitted_at: DateTime<Utc>,
}

impl Default for TestSubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSubmissionBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            policy_id: IdFixtures::policy_id(),
            client_id: IdFixtures::client_id(),
            amount: MoneyFixtures::usd_small_claim(),
            description: Some(StringFixtures::detailed_description().to_string()),
            photo_count: Some(3),
            incident_date: Some(TemporalFixtures::weekday_incident()),
            prior_claims: 0,
            policy_start_date: Some(TemporalFixtures::mature_policy_start()),
            submitted_at: TemporalFixtures::filed_at(),
        }
    }

    pub fn with_policy_id(mut self, id: PolicyId) -> Self {
        self.policy_id = id;
        self
    }

    pub fn with_client_id(mut self, id: ClientId) -> Self {
        self.client_id = id;
        self
    }

    /// Sets the requested amount in USD
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Money::usd(amount);
        self
    }

    pub fn with_money(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn without_description(mut self) -> Self {
        self.description = None;
        self
    }

    pub fn with_photos(mut self, count: u32) -> Self {
        self.photo_count = Some(count);
        self
    }

    pub fn without_photos(mut self) -> Self {
        self.photo_count = None;
        self
    }

    pub fn with_incident_date(mut self, date: NaiveDate) -> Self {
        self.incident_date = Some(date);
        self
    }

    pub fn without_incident_date(mut self) -> Self {
        self.incident_date = None;
        self
    }

    pub fn with_prior_claims(mut self, count: u32) -> Self {
        self.prior_claims = count;
        self
    }

    pub fn with_policy_start(mut self, date: NaiveDate) -> Self {
        self.policy_start_date = Some(date);
        self
    }

    /// Drops the policy start date so tenure falls back to the calendar proxy
    pub fn without_policy_start(mut self) -> Self {
        self.policy_start_date = None;
        self
    }

    pub fn filed_at(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = at;
        self
    }

    /// Strips every optional piece of evidence
    pub fn undocumented(self) -> Self {
        self.without_description().without_photos().without_incident_date()
    }

    /// Builds the submission
    pub fn build(self) -> ClaimSubmission {
        ClaimSubmission {
            policy_id: self.policy_id,
            client_id: self.client_id,
            incident_date: self.incident_date,
            description: self.description,
            amount_requested: self.amount,
            photo_count: self.photo_count,
            prior_claims: self.prior_claims,
            policy_start_date: self.policy_start_date,
            submitted_at: self.submitted_at,
        }
    }
}

/// Builder for open claims that bypass the engine and repository
#[derive(Debug, Clone, Default)]
pub struct TestClaimBuilder {
    submission: TestSubmissionBuilder,
    history_count: u32,
}

impl TestClaimBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submission(mut self, submission: TestSubmissionBuilder) -> Self {
        self.submission = submission;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.submission = self.submission.with_amount(amount);
        self
    }

    pub fn with_history(mut self, count: u32) -> Self {
        self.history_count = count;
        self
    }

    /// Assesses the submission and opens a pending claim
    ///
    /// # Panics
    ///
    /// Panics if the claim cannot be opened (reserve overflow)
    pub fn build(self) -> Claim {
        let submission = self.submission.build();
        let assessment = assess(&submission, self.history_count);
        Claim::open(submission, assessment).expect("builder amounts open cleanly")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::{ClaimStatus, WorkflowTier};
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_submission_is_clean() {
        let submission = TestSubmissionBuilder::new().build();
        let assessment = assess(&submission, 0);
        assert_eq!(assessment.fraud_score, 0);
        assert_eq!(assessment.confidence_level, 100);
    }

    #[test]
    fn test_claim_builder_routes_by_amount() {
        let claim = TestClaimBuilder::new().with_amount(dec!(30000.25)).build();
        assert_eq!(claim.tier, WorkflowTier::L2);
        assert_eq!(claim.status, ClaimStatus::PendingL2);
    }

    #[test]
    fn test_undocumented_submission() {
        let submission = TestSubmissionBuilder::new().undocumented().build();
        assert!(submission.description.is_none());
        assert!(!submission.has_photos());
        assert!(submission.incident_date.is_none());
    }
}
