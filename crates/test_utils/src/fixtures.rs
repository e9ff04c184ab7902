//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the claims workflow. Dates are fixed
//! so that temporal and tenure scoring is predictable regardless of when the
//! suite runs.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{ClientId, Currency, Money, PolicyId};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Routine claim well inside L1 authority
    pub fn usd_small_claim() -> Money {
        Money::new(dec!(2450.75), Currency::USD)
    }

    /// Claim inside the L2 band that is not a round figure
    pub fn usd_mid_claim() -> Money {
        Money::new(dec!(25350.40), Currency::USD)
    }

    /// Claim above the L2 ceiling
    pub fn usd_large_claim() -> Money {
        Money::new(dec!(75000.00), Currency::USD)
    }

    /// Creates a zero amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// Creates a EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }

    pub fn usd_negative() -> Money {
        Money::new(dec!(-50.00), Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Filing instant: Wednesday 17 July 2024, 10:00 UTC
    pub fn filed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 17, 10, 0, 0).unwrap()
    }

    /// Filing instant in the first half of the year (Monday 12 February 2024)
    pub fn filed_early_in_year() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 12, 10, 0, 0).unwrap()
    }

    /// Weekday incident a week before [`TemporalFixtures::filed_at`]
    pub fn weekday_incident() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 10).unwrap()
    }

    /// Saturday incident
    pub fn weekend_incident() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 13).unwrap()
    }

    /// Established policy inception date
    pub fn mature_policy_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 5, 1).unwrap()
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    pub fn detailed_description() -> &'static str {
        "Rear-ended at a red light; bumper, boot lid and tail lights damaged"
    }

    pub fn short_description() -> &'static str {
        "Car damaged"
    }

    pub fn adjuster() -> &'static str {
        "reserving.analyst@example.com"
    }
}

/// Fixture for ID test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn policy_id() -> PolicyId {
        PolicyId::new_v7()
    }

    pub fn client_id() -> ClientId {
        ClientId::new_v7()
    }

    /// A nil policy reference, rejected at submission
    pub fn nil_policy_id() -> PolicyId {
        PolicyId::from_uuid(Uuid::nil())
    }

    pub fn nil_client_id() -> ClientId {
        ClientId::from_uuid(Uuid::nil())
    }
}
