//! Route handlers

pub mod claims;
pub mod health;
pub mod reserves;
