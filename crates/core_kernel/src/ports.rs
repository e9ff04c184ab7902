//! Ports and Adapters Infrastructure
//!
//! The engine never talks to a storage technology directly. Each domain defines
//! a port trait extending [`DomainPort`]; adapters (in-memory, database, remote
//! system of record) implement it and report failures as [`PortError`].
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait ClaimRepository: DomainPort + HealthCheckable {
//!     async fn get(&self, id: ClaimId) -> Result<Claim, PortError>;
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Domain code treats these as opaque storage failures and propagates them
/// unchanged, except for `NotFound` which maps onto the domain's own variant.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The adapter rejected the data it was given
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// Optimistic concurrency check failed
    #[error("Conflict: {entity_type} {id} expected version {expected}, found {actual}")]
    Conflict {
        entity_type: String,
        id: String,
        expected: u64,
        actual: u64,
    },

    /// An entity with the same identity already exists
    #[error("Duplicate: {entity_type} with id {id}")]
    Duplicate {
        entity_type: String,
        id: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal adapter error
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(
        entity_type: impl Into<String>,
        id: impl fmt::Display,
        expected: u64,
        actual: u64,
    ) -> Self {
        PortError::Conflict {
            entity_type: entity_type.into(),
            id: id.to_string(),
            expected,
            actual,
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::Duplicate {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared across tokio tasks, so every implementation must be
/// thread-safe.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    /// A healthy result stamped with the current time
    pub fn healthy(adapter_id: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Claim", "123");
        assert!(error.is_not_found());
        assert!(!error.is_conflict());
        assert!(error.to_string().contains("Claim"));
        assert!(error.to_string().contains("123"));
    }

    #[test]
    fn test_conflict_reports_versions() {
        let error = PortError::conflict("Claim", "abc", 2, 3);
        assert!(error.is_conflict());
        assert!(!error.is_not_found());
        assert!(error.to_string().contains("expected version 2"));
    }

    #[test]
    fn test_connection_error_keeps_message() {
        let error = PortError::connection("claims store unreachable");
        assert!(matches!(error, PortError::Connection { source: None, .. }));
        assert_eq!(error.to_string(), "Connection error: claims store unreachable");
    }

    #[test]
    fn test_healthy_result() {
        let result = HealthCheckResult::healthy("memory").with_message("ok");
        assert_eq!(result.status, AdapterHealth::Healthy);
        assert_eq!(result.message.as_deref(), Some("ok"));
    }
}
