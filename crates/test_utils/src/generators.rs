//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use core_kernel::{ClaimId, ClientId, Money, PolicyId};
use domain_claims::{ApproverRole, ClaimSubmission, Decision};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Strategy for requested amounts in USD, from zero to $500,000
///
/// Mixes arbitrary cent amounts with exact thousands so the round-number
/// rule gets exercised.
pub fn usd_claim_amount_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (0i64..=50_000_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        (1u32..500u32).prop_map(|thousands| Decimal::from(thousands * 1000)),
    ]
}

pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    usd_claim_amount_strategy().prop_map(Money::usd)
}

/// Strategy for fraud scores
pub fn fraud_score_strategy() -> impl Strategy<Value = u8> {
    0u8..=100u8
}

/// Strategy for claimant history counts
pub fn history_count_strategy() -> impl Strategy<Value = u32> {
    0u32..12u32
}

/// Strategy for generating timestamps in 2024
pub fn timestamp_2024_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..365i64, 0i64..86_400i64).prop_map(|(days, secs)| {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + Duration::days(days)
            + Duration::seconds(secs)
    })
}

/// Strategy for incident descriptions, both sufficient and too short
pub fn description_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Hit a deer on the county road at dusk".to_string()),
        Just("Broken".to_string()),
        "[a-zA-Z ]{0,60}",
    ]
}

/// Strategy for generating non-nil PolicyId values
pub fn policy_id_strategy() -> impl Strategy<Value = PolicyId> {
    (1u128..=u128::MAX).prop_map(|n| PolicyId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating non-nil ClientId values
pub fn client_id_strategy() -> impl Strategy<Value = ClientId> {
    (1u128..=u128::MAX).prop_map(|n| ClientId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating ClaimId
pub fn claim_id_strategy() -> impl Strategy<Value = ClaimId> {
    any::<u128>().prop_map(|n| ClaimId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for valid claim submissions
///
/// Incident dates range from a few days after filing to well past the
/// late-filing threshold; policy start dates, when present, precede filing.
pub fn submission_strategy() -> impl Strategy<Value = ClaimSubmission> {
    (
        policy_id_strategy(),
        client_id_strategy(),
        usd_claim_amount_strategy(),
        prop::option::of(description_strategy()),
        prop::option::of(0u32..6u32),
        timestamp_2024_strategy(),
        prop::option::of(-3i64..200i64),
        0u32..10u32,
        prop::option::of(0i64..2000i64),
    )
        .prop_map(
            |(policy_id, client_id, amount, description, photos, filed, incident_offset, prior, tenure_days)| {
                let filed_date = filed.date_naive();
                ClaimSubmission {
                    policy_id,
                    client_id,
                    incident_date: incident_offset.map(|d| days_before(filed_date, d)),
                    description,
                    amount_requested: Money::usd(amount),
                    photo_count: photos,
                    prior_claims: prior,
                    policy_start_date: tenure_days.map(|d| days_before(filed_date, d)),
                    submitted_at: filed,
                }
            },
        )
}

pub fn approver_role_strategy() -> impl Strategy<Value = ApproverRole> {
    prop_oneof![
        Just(ApproverRole::L1Approver),
        Just(ApproverRole::L2Approver),
        Just(ApproverRole::L3Approver),
    ]
}

/// Strategy for decisions; approvals use the default amount
pub fn decision_strategy() -> impl Strategy<Value = Decision> {
    prop_oneof![
        Just(Decision::approve()),
        Just(Decision::Deny),
        Just(Decision::Escalate),
    ]
}

fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date - Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;

    proptest! {
        #[test]
        fn claim_amounts_are_never_negative(amount in usd_claim_amount_strategy()) {
            prop_assert!(amount >= Decimal::ZERO);
        }

        #[test]
        fn generated_submissions_validate(submission in submission_strategy()) {
            prop_assert!(submission.validate(Currency::USD).is_ok());
        }

        #[test]
        fn policy_start_never_after_filing(submission in submission_strategy()) {
            if let Some(start) = submission.policy_start_date {
                prop_assert!(start <= submission.claim_date());
            }
        }
    }
}
