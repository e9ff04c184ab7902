//! Approval tiers, approver roles and initial routing
//!
//! ```text
//! amount > $50k  or score > 60  ->  L3
//! amount >= $10k or score > 30  ->  L2
//! otherwise                     ->  L1
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::Money;
use crate::error::ClaimError;
use crate::scoring::{HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};

/// Lower bound (inclusive) of the L2 authority band
pub const L2_AMOUNT_FLOOR: Decimal = dec!(10000);
/// Upper bound (inclusive) of the L2 authority band; anything above is L3
pub const L2_AMOUNT_CEILING: Decimal = dec!(50000);

/// Approval tier; ordering follows authority (L1 < L2 < L3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkflowTier {
    L1,
    L2,
    L3,
}

impl WorkflowTier {
    pub const ALL: [WorkflowTier; 3] = [WorkflowTier::L1, WorkflowTier::L2, WorkflowTier::L3];

    /// The tier an escalation moves to, or `None` from the top tier
    pub fn next(&self) -> Option<WorkflowTier> {
        match self {
            WorkflowTier::L1 => Some(WorkflowTier::L2),
            WorkflowTier::L2 => Some(WorkflowTier::L3),
            WorkflowTier::L3 => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowTier::L1 => "L1",
            WorkflowTier::L2 => "L2",
            WorkflowTier::L3 => "L3",
        }
    }
}

impl fmt::Display for WorkflowTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowTier {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L1" => Ok(WorkflowTier::L1),
            "L2" => Ok(WorkflowTier::L2),
            "L3" => Ok(WorkflowTier::L3),
            other => Err(ClaimError::validation(format!("unknown workflow tier: {}", other))),
        }
    }
}

/// Approver roles
///
/// A closed set: a misspelt role fails to parse instead of silently losing
/// authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApproverRole {
    #[serde(rename = "L1_APPROVER")]
    L1Approver,
    #[serde(rename = "L2_APPROVER")]
    L2Approver,
    #[serde(rename = "L3_APPROVER")]
    L3Approver,
}

impl ApproverRole {
    /// Highest tier this role may decide
    pub fn authority(&self) -> WorkflowTier {
        match self {
            ApproverRole::L1Approver => WorkflowTier::L1,
            ApproverRole::L2Approver => WorkflowTier::L2,
            ApproverRole::L3Approver => WorkflowTier::L3,
        }
    }

    /// True if the role's authority is at or above `tier`
    pub fn can_act_on(&self, tier: WorkflowTier) -> bool {
        self.authority() >= tier
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApproverRole::L1Approver => "L1_APPROVER",
            ApproverRole::L2Approver => "L2_APPROVER",
            ApproverRole::L3Approver => "L3_APPROVER",
        }
    }
}

impl fmt::Display for ApproverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApproverRole {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L1_APPROVER" => Ok(ApproverRole::L1Approver),
            "L2_APPROVER" => Ok(ApproverRole::L2Approver),
            "L3_APPROVER" => Ok(ApproverRole::L3Approver),
            other => Err(ClaimError::validation(format!("unknown approver role: {}", other))),
        }
    }
}

/// Picks the tier a newly submitted claim starts at
///
/// Amount and fraud score are checked jointly; the highest tier either of
/// them demands wins.
pub fn route_initial_tier(amount: &Money, fraud_score: u8) -> WorkflowTier {
    let amount = amount.amount();
    if amount > L2_AMOUNT_CEILING || fraud_score > HIGH_RISK_THRESHOLD {
        WorkflowTier::L3
    } else if amount >= L2_AMOUNT_FLOOR || fraud_score > MEDIUM_RISK_THRESHOLD {
        WorkflowTier::L2
    } else {
        WorkflowTier::L1
    }
}
