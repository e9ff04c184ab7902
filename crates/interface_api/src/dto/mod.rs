//! Request and response types

pub mod claims;
pub mod reserves;
