//! Claims Workflow Domain
//!
//! This crate scores incoming claims for fraud risk, routes them to an
//! approval tier, runs the multi-level approval state machine and keeps the
//! reserve position up to date.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Submission -> Risk assessment -> Pending L1/L2/L3 -> Approved | Denied
//!                                       |      ^
//!                                       +------+ escalate
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let engine = ClaimsEngine::new(Arc::new(InMemoryClaimRepository::new()), EngineConfig::default());
//! let history = engine.claimant_history(submission.client_id, submission.prior_claims).await?;
//! let claim = engine.submit_claim(submission, history).await?;
//! engine.decide_claim(claim.id, Decision::approve(), ApproverRole::L2Approver, "Verified").await?;
//! ```

pub mod approval;
pub mod claim;
pub mod error;
pub mod ports;
pub mod reserve;
pub mod risk_factors;
pub mod scoring;
pub mod service;
pub mod submission;
pub mod workflow;

pub use approval::{ApprovalAction, ApprovalLog, ApprovalRecord};
pub use claim::{Claim, ClaimStatus, Decision};
pub use error::ClaimError;
pub use ports::{ClaimQuery, ClaimRepository};
pub use ports::memory::InMemoryClaimRepository;
pub use reserve::{
    calculate_reserve, AdjustmentType, ReserveAdjustment, ReserveAdjustmentStats, ReserveSnapshot,
};
pub use risk_factors::{RiskDimension, RiskFactor};
pub use scoring::{assess, RiskAssessment, RiskBand, RiskFactors, RiskFlag};
pub use service::{ClaimsEngine, EngineConfig, QueueSummary};
pub use submission::{ClaimSubmission, MAX_CLAIM_AMOUNT};
pub use workflow::{route_initial_tier, ApproverRole, WorkflowTier};
