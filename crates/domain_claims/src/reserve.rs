//! Claim reserves
//!
//! A claim's reserve is the money set aside for its expected future payout.
//! It is always derived from the claim and never stored independently:
//!
//! ```text
//! Pending   ->  requested x multiplier
//! Approved  ->  max(0, requested - approved) x multiplier
//! Denied    ->  0
//! ```
//!
//! Manual adjustments are kept in a separate audit ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{AdjustmentId, ClaimId, Currency, Money, MoneyError, PolicyId};
use crate::claim::{Claim, ClaimStatus};
use crate::error::{require_reason, ClaimError};
use crate::scoring::RiskBand;

impl RiskBand {
    /// Loading applied to reserves for claims in this band
    pub fn reserve_multiplier(&self) -> Decimal {
        match self {
            RiskBand::High => dec!(1.2),
            RiskBand::Medium => dec!(1.1),
            RiskBand::Low => dec!(1.0),
        }
    }
}

/// Reserve multiplier for a fraud score
pub fn risk_multiplier(fraud_score: u8) -> Decimal {
    RiskBand::from_score(fraud_score).reserve_multiplier()
}

/// Calculates a reserve, rounded to the currency's minor unit
///
/// # Arguments
///
/// * `status` - Current claim status
/// * `requested` - Amount the claimant asked for
/// * `approved` - Amount approved so far (zero unless approved)
/// * `fraud_score` - Score from the claim's risk assessment
///
/// # Errors
///
/// `MoneyError::Overflow` when the loaded reserve does not fit a `Decimal`,
/// `MoneyError::CurrencyMismatch` when `approved` is in another currency.
pub fn calculate_reserve(
    status: ClaimStatus,
    requested: &Money,
    approved: &Money,
    fraud_score: u8,
) -> Result<Money, MoneyError> {
    let exposure = match status {
        ClaimStatus::PendingL1 | ClaimStatus::PendingL2 | ClaimStatus::PendingL3 => *requested,
        ClaimStatus::Approved => requested.checked_sub(approved)?.floor_zero(),
        ClaimStatus::Denied => Money::zero(requested.currency()),
    };
    Ok(exposure
        .multiply(risk_multiplier(fraud_score))?
        .round_to_currency())
}

/// Reserve for a claim in its current state
pub fn claim_reserve(claim: &Claim) -> Result<Money, MoneyError> {
    calculate_reserve(
        claim.status,
        &claim.submission.amount_requested,
        &claim.amount_approved,
        claim.assessment.fraud_score,
    )
}

/// Aggregate reserve position over a set of claims
///
/// Every status and risk band is present in the breakdowns, zero when no
/// claim falls in it, so the partitions always sum to `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    pub currency: Currency,
    pub total: Money,
    pub by_status: BTreeMap<ClaimStatus, Money>,
    pub by_risk_band: BTreeMap<RiskBand, Money>,
    pub by_policy: BTreeMap<PolicyId, Money>,
    pub claim_count: usize,
    /// Zero for an empty book
    pub mean_per_claim: Money,
    pub generated_at: DateTime<Utc>,
}

impl ReserveSnapshot {
    /// Builds a snapshot from stored claim reserves
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::CurrencyMismatch` if a claim is not in `currency`.
    pub fn from_claims(claims: &[Claim], currency: Currency) -> Result<Self, MoneyError> {
        let zero = Money::zero(currency);
        let mut total = zero;
        let mut by_status: BTreeMap<ClaimStatus, Money> =
            ClaimStatus::ALL.iter().map(|s| (*s, zero)).collect();
        let mut by_risk_band: BTreeMap<RiskBand, Money> =
            RiskBand::ALL.iter().map(|b| (*b, zero)).collect();
        let mut by_policy: BTreeMap<PolicyId, Money> = BTreeMap::new();

        for claim in claims {
            let reserve = claim.reserve_amount;
            total = total.checked_add(&reserve)?;

            let slot = by_status.entry(claim.status).or_insert(zero);
            *slot = slot.checked_add(&reserve)?;

            let slot = by_risk_band.entry(claim.risk_band()).or_insert(zero);
            *slot = slot.checked_add(&reserve)?;

            let slot = by_policy.entry(claim.policy_id()).or_insert(zero);
            *slot = slot.checked_add(&reserve)?;
        }

        let mean_per_claim = if claims.is_empty() {
            zero
        } else {
            total.divide(Decimal::from(claims.len()))?.round_to_currency()
        };

        Ok(Self {
            currency,
            total,
            by_status,
            by_risk_band,
            by_policy,
            claim_count: claims.len(),
            mean_per_claim,
            generated_at: Utc::now(),
        })
    }

    pub fn for_status(&self, status: ClaimStatus) -> Money {
        self.by_status.get(&status).copied().unwrap_or(Money::zero(self.currency))
    }

    pub fn for_risk_band(&self, band: RiskBand) -> Money {
        self.by_risk_band.get(&band).copied().unwrap_or(Money::zero(self.currency))
    }

    /// Reserve still held against claims awaiting a decision
    pub fn pending_total(&self) -> Money {
        let amount = self
            .by_status
            .iter()
            .filter(|(status, _)| status.is_pending())
            .map(|(_, m)| m.amount())
            .sum();
        Money::new(amount, self.currency)
    }
}

/// Direction of a manual reserve adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    Increase,
    Decrease,
}

/// A manual reserve adjustment recorded by a reserving analyst
///
/// Adjustments are audit notes: they never change the claim's derived reserve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveAdjustment {
    pub id: AdjustmentId,
    pub claim_id: ClaimId,
    pub adjustment_type: AdjustmentType,
    pub amount: Money,
    /// Claim reserve at the time of the adjustment
    pub previous_reserve: Money,
    /// Resulting reserve, never below zero
    pub new_reserve: Money,
    pub reason: String,
    pub adjusted_by: String,
    pub created_at: DateTime<Utc>,
}

impl ReserveAdjustment {
    /// Records an adjustment against a claim's current reserve
    ///
    /// # Errors
    ///
    /// * `MissingReason` if `reason` is blank
    /// * `Validation` if the amount is not positive, not in the claim's
    ///   currency, or `adjusted_by` is blank
    pub fn new(
        claim: &Claim,
        adjustment_type: AdjustmentType,
        amount: Money,
        reason: &str,
        adjusted_by: &str,
    ) -> Result<Self, ClaimError> {
        let reason = require_reason("adjust the reserve of", reason)?;
        let adjusted_by = adjusted_by.trim();
        if adjusted_by.is_empty() {
            return Err(ClaimError::validation("adjusted_by is required"));
        }
        if amount.is_negative() || amount.is_zero() {
            return Err(ClaimError::validation(format!(
                "adjustment amount must be positive, got {}",
                amount
            )));
        }

        let previous_reserve = claim.reserve_amount;
        let new_reserve = match adjustment_type {
            AdjustmentType::Increase => previous_reserve.checked_add(&amount)?,
            AdjustmentType::Decrease => previous_reserve.checked_sub(&amount)?.floor_zero(),
        };

        Ok(Self {
            id: AdjustmentId::new_v7(),
            claim_id: claim.id,
            adjustment_type,
            amount,
            previous_reserve,
            new_reserve,
            reason,
            adjusted_by: adjusted_by.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Summary of the adjustment ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveAdjustmentStats {
    pub total_adjustments: usize,
    pub increases: usize,
    pub decreases: usize,
    pub total_increase: Money,
    pub total_decrease: Money,
    /// `total_increase - total_decrease`
    pub net_adjustment: Money,
}

impl ReserveAdjustmentStats {
    pub fn from_adjustments(
        adjustments: &[ReserveAdjustment],
        currency: Currency,
    ) -> Result<Self, MoneyError> {
        let (ups, downs): (Vec<&ReserveAdjustment>, Vec<&ReserveAdjustment>) = adjustments
            .iter()
            .partition(|a| a.adjustment_type == AdjustmentType::Increase);

        let total_increase = Money::sum(currency, ups.iter().map(|a| &a.amount))?;
        let total_decrease = Money::sum(currency, downs.iter().map(|a| &a.amount))?;

        Ok(Self {
            total_adjustments: adjustments.len(),
            increases: ups.len(),
            decreases: downs.len(),
            total_increase,
            total_decrease,
            net_adjustment: total_increase.checked_sub(&total_decrease)?,
        })
    }
}
