//! Core Kernel - Foundational types for the claims workflow engine
//!
//! This crate provides the building blocks shared by the domain and API crates:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Port error and health-check abstractions for swappable adapters

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{ClaimId, PolicyId, ClientId, AdjustmentId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
