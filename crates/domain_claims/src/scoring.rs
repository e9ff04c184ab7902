//! Risk scoring engine
//!
//! Combines the four factor scores into a fraud score and a confidence level.
//! `assess` is pure: the same submission and history count always yield the
//! same assessment.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::risk_factors::{
    analyze_amount, analyze_data_completeness, analyze_historical, analyze_temporal, RiskFactor,
};
use crate::submission::ClaimSubmission;

/// Scores above this are high risk
pub const HIGH_RISK_THRESHOLD: u8 = 60;
/// Scores above this (and not high) are medium risk
pub const MEDIUM_RISK_THRESHOLD: u8 = 30;
/// Confidence at or above this makes a risk call definite rather than probable
pub const HIGH_CONFIDENCE_THRESHOLD: u8 = 70;

/// Coarse risk band derived from the fraud score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub const ALL: [RiskBand; 3] = [RiskBand::Low, RiskBand::Medium, RiskBand::High];

    pub fn from_score(fraud_score: u8) -> Self {
        if fraud_score > HIGH_RISK_THRESHOLD {
            RiskBand::High
        } else if fraud_score > MEDIUM_RISK_THRESHOLD {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short risk indicators shown alongside a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFlag {
    #[serde(rename = "High amount")]
    HighAmount,
    #[serde(rename = "No photos provided")]
    NoPhotos,
    #[serde(rename = "High fraud risk")]
    HighFraudRisk,
    #[serde(rename = "Multiple claims")]
    MultipleClaims,
}

impl RiskFlag {
    pub fn label(&self) -> &'static str {
        match self {
            RiskFlag::HighAmount => "High amount",
            RiskFlag::NoPhotos => "No photos provided",
            RiskFlag::HighFraudRisk => "High fraud risk",
            RiskFlag::MultipleClaims => "Multiple claims",
        }
    }
}

/// The four factor scores of one assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub amount: RiskFactor,
    pub temporal: RiskFactor,
    pub data_completeness: RiskFactor,
    pub historical: RiskFactor,
}

impl RiskFactors {
    /// Runs all four analyzers
    pub fn analyze(submission: &ClaimSubmission, history_count: u32) -> Self {
        Self {
            amount: analyze_amount(submission),
            temporal: analyze_temporal(submission),
            data_completeness: analyze_data_completeness(submission),
            historical: analyze_historical(submission, history_count),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RiskFactor> {
        [&self.amount, &self.temporal, &self.data_completeness, &self.historical].into_iter()
    }

    /// Sum of the rounded per-factor contributions
    pub fn total_contribution(&self) -> u32 {
        self.iter().map(|f| f.contribution as u32).sum()
    }
}

/// Outcome of scoring a submission
///
/// Created once at submission time and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Likelihood of fraud, 0-100
    pub fraud_score: u8,
    /// How well the evidence supports the score, 0-100
    pub confidence_level: u8,
    pub factors: RiskFactors,
    pub flags: Vec<RiskFlag>,
}

impl RiskAssessment {
    pub fn band(&self) -> RiskBand {
        RiskBand::from_score(self.fraud_score)
    }

    /// Display label combining band and confidence
    ///
    /// A high or medium score backed by weak evidence is reported as probable
    /// or possible rather than definite.
    pub fn risk_label(&self) -> &'static str {
        let confident = self.confidence_level >= HIGH_CONFIDENCE_THRESHOLD;
        match (self.band(), confident) {
            (RiskBand::High, true) => "HIGH RISK",
            (RiskBand::High, false) => "PROBABLE RISK",
            (RiskBand::Medium, true) => "MEDIUM RISK",
            (RiskBand::Medium, false) => "POSSIBLE RISK",
            (RiskBand::Low, _) => "LOW RISK",
        }
    }

    pub fn has_flag(&self, flag: RiskFlag) -> bool {
        self.flags.contains(&flag)
    }
}

/// Scores a submission
///
/// # Arguments
///
/// * `submission` - The claim being scored
/// * `history_count` - Claims the claimant already has on record
///
/// # Example
///
/// ```rust,ignore
/// let assessment = assess(&submission, 0);
/// if assessment.has_flag(RiskFlag::HighFraudRisk) {
///     // route for special investigation
/// }
/// ```
pub fn assess(submission: &ClaimSubmission, history_count: u32) -> RiskAssessment {
    let factors = RiskFactors::analyze(submission, history_count);
    let fraud_score = fraud_score(&factors);
    let confidence_level = confidence_level(submission, &factors);
    let flags = flags(submission, fraud_score, history_count);

    RiskAssessment {
        fraud_score,
        confidence_level,
        factors,
        flags,
    }
}

/// Weighted sum of the factor scores, rounded half up and clamped to 0-100
fn fraud_score(factors: &RiskFactors) -> u8 {
    let weighted: Decimal = factors.iter().map(RiskFactor::weighted_score).sum();
    weighted
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(dec!(0), dec!(100))
        .to_u8()
        .unwrap_or(100)
}

fn confidence_level(submission: &ClaimSubmission, factors: &RiskFactors) -> u8 {
    let mut confidence: i32 = 100;

    if submission.has_insufficient_description() {
        confidence -= 15;
    }
    if !submission.has_photos() {
        confidence -= 10;
    }
    if submission.incident_date.is_none() {
        confidence -= 10;
    }

    // Strong, consistent signals make the call more reliable
    if factors.total_contribution() > 60 {
        confidence += 10;
    }
    if factors.iter().filter(|f| f.score > 70).count() >= 2 {
        confidence += 5;
    }

    confidence.clamp(0, 100) as u8
}

fn flags(submission: &ClaimSubmission, fraud_score: u8, history_count: u32) -> Vec<RiskFlag> {
    let mut flags = Vec::new();
    if submission.amount_requested.amount() > dec!(10000) {
        flags.push(RiskFlag::HighAmount);
    }
    if !submission.has_photos() {
        flags.push(RiskFlag::NoPhotos);
    }
    if fraud_score > HIGH_RISK_THRESHOLD {
        flags.push(RiskFlag::HighFraudRisk);
    }
    if history_count > 2 {
        flags.push(RiskFlag::MultipleClaims);
    }
    flags
}
