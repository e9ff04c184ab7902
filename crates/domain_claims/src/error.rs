//! Claims domain errors

use thiserror::Error;

use core_kernel::{ClaimId, MoneyError, PortError};

/// Errors that can occur in the claims workflow
///
/// Every variant is recoverable: the caller retries with corrected input or a
/// different approver. None of them leaves a claim partially mutated.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Malformed or missing submission/decision data
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Claim not found: {0}")]
    NotFound(ClaimId),

    /// The approver's authority is below the claim's current tier
    #[error("Unauthorized: {role} cannot act on a claim at tier {tier}")]
    Unauthorized { role: String, tier: String },

    /// The action is not allowed from the claim's current status
    #[error("Invalid transition: cannot {action} a claim that is {status}")]
    InvalidTransition { action: String, status: String },

    #[error("A non-empty reason is required to {0} a claim")]
    MissingReason(String),

    /// Opaque failure reported by the storage collaborator
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl ClaimError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClaimError::Validation(message.into())
    }

    /// Maps a port failure, turning a missing record into `NotFound`
    pub fn from_port(id: ClaimId, error: PortError) -> Self {
        if error.is_not_found() {
            ClaimError::NotFound(id)
        } else {
            ClaimError::Storage(error)
        }
    }
}

impl From<MoneyError> for ClaimError {
    fn from(error: MoneyError) -> Self {
        ClaimError::Validation(error.to_string())
    }
}

/// Trims a decision reason and rejects it when blank
pub(crate) fn require_reason(action: &str, reason: &str) -> Result<String, ClaimError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(ClaimError::MissingReason(action.to_string()));
    }
    Ok(trimmed.to_string())
}
