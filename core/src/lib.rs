//! # HealthSys Core
//!
//! Core domain layer for the HealthSys registration flow.
//! This crate contains the verification code entity, the in-memory code
//! cache with its background sweeper, and the service facade used by the
//! registration workflow.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
