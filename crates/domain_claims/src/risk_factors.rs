//! Risk factor analyzers
//!
//! Four independent, pure analyzers each score one fraud-risk dimension of a
//! submission on a 0-100 scale and record the reasons that fired. The scoring
//! engine combines them with fixed weights.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::submission::ClaimSubmission;

/// Upper bound for every factor score
pub const MAX_FACTOR_SCORE: u8 = 100;

/// A risk dimension and its fixed weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskDimension {
    Amount,
    Temporal,
    DataCompleteness,
    Historical,
}

impl RiskDimension {
    /// Weight as a percentage; the four weights sum to 100
    pub fn weight(&self) -> u8 {
        match self {
            RiskDimension::Amount => 30,
            RiskDimension::Temporal => 25,
            RiskDimension::DataCompleteness => 20,
            RiskDimension::Historical => 25,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskDimension::Amount => "Amount risk",
            RiskDimension::Temporal => "Temporal risk",
            RiskDimension::DataCompleteness => "Data completeness",
            RiskDimension::Historical => "Historical risk",
        }
    }
}

/// Score for one risk dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub dimension: RiskDimension,
    /// Raw score, 0-100
    pub score: u8,
    /// Weight percentage
    pub weight: u8,
    /// Human-readable reasons, in the order they fired
    pub reasons: Vec<String>,
    /// `score x weight / 100`, rounded to a whole point
    pub contribution: u8,
}

impl RiskFactor {
    fn from_points(dimension: RiskDimension, points: u32, reasons: Vec<String>) -> Self {
        let score = points.min(MAX_FACTOR_SCORE as u32) as u8;
        let weight = dimension.weight();
        let mut factor = Self {
            dimension,
            score,
            weight,
            reasons,
            contribution: 0,
        };
        factor.contribution = factor
            .weighted_score()
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u8()
            .unwrap_or(MAX_FACTOR_SCORE);
        factor
    }

    /// Unrounded weighted score, used for the overall fraud score
    pub fn weighted_score(&self) -> Decimal {
        Decimal::from(self.score) * Decimal::from(self.weight) / dec!(100)
    }
}

/// Accumulates points and reasons for a single analyzer
struct Tally {
    points: u32,
    reasons: Vec<String>,
}

impl Tally {
    fn new() -> Self {
        Self { points: 0, reasons: Vec::new() }
    }

    fn add_if(&mut self, condition: bool, points: u32, reason: &str) {
        if condition {
            self.points += points;
            self.reasons.push(reason.to_string());
        }
    }

    fn finish(self, dimension: RiskDimension) -> RiskFactor {
        RiskFactor::from_points(dimension, self.points, self.reasons)
    }
}

/// Scores the requested amount
///
/// Large claims and suspiciously round figures (likely estimates rather than
/// invoiced amounts) raise the score.
pub fn analyze_amount(submission: &ClaimSubmission) -> RiskFactor {
    let amount = submission.amount_requested.amount();
    let mut tally = Tally::new();

    tally.add_if(amount > dec!(50000), 40, "High claim amount (>$50k)");
    tally.add_if(amount > dec!(100000), 30, "Very high claim amount (>$100k)");
    tally.add_if(
        amount > dec!(10000) && submission.amount_requested.is_multiple_of(dec!(1000)),
        20,
        "Round number claim (possible estimation)",
    );

    tally.finish(RiskDimension::Amount)
}

/// Scores the timing of the filing relative to the incident
///
/// A missing incident date contributes nothing here; it is penalised by
/// [`analyze_data_completeness`] instead.
pub fn analyze_temporal(submission: &ClaimSubmission) -> RiskFactor {
    let mut tally = Tally::new();

    if let (Some(incident), Some(days)) = (submission.incident_date, submission.days_since_incident()) {
        tally.add_if(days < 1, 35, "Same-day claim filing");
        tally.add_if(days > 90, 25, "Late claim filing (>90 days)");
        tally.add_if(is_weekend(incident), 15, "Weekend incident");
    }

    tally.finish(RiskDimension::Temporal)
}

/// Scores how much supporting evidence the submission carries
pub fn analyze_data_completeness(submission: &ClaimSubmission) -> RiskFactor {
    let mut tally = Tally::new();

    tally.add_if(
        submission.has_insufficient_description(),
        40,
        "Insufficient incident description",
    );
    tally.add_if(!submission.has_photos(), 35, "No supporting photos");
    tally.add_if(submission.incident_date.is_none(), 25, "Missing incident date");

    tally.finish(RiskDimension::DataCompleteness)
}

/// Scores the claimant's history and the policy's tenure
///
/// # Arguments
///
/// * `submission` - The claim being assessed
/// * `history_count` - Number of claims the claimant already has on record
pub fn analyze_historical(submission: &ClaimSubmission, history_count: u32) -> RiskFactor {
    let mut tally = Tally::new();

    tally.add_if(history_count > 3, 40, "Multiple previous claims");
    tally.add_if(history_count > 5, 30, "Excessive claim history (>5 claims)");
    tally.add_if(
        policy_tenure_months(submission) < 6,
        20,
        "New policy (<6 months)",
    );

    tally.finish(RiskDimension::Historical)
}

/// Policy tenure at filing, in whole 30-day months
///
/// Uses the policy start date when intake supplies it. Otherwise falls back to
/// the months elapsed since 1 January of the filing year, a coarse proxy that
/// flags every claim filed in the first half of a calendar year.
pub fn policy_tenure_months(submission: &ClaimSubmission) -> i64 {
    let claim_date = submission.claim_date();
    let start = submission
        .policy_start_date
        .or_else(|| NaiveDate::from_ymd_opt(claim_date.year(), 1, 1))
        .unwrap_or(claim_date);
    (claim_date - start).num_days().div_euclid(30)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
