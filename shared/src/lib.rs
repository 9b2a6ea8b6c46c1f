//! Shared types and models for the Astral Insights platform
//!
//! This crate contains the domain types shared between the backend services
//! and any other components of the system: chart snapshots, birth records,
//! forecast cache entries, and input validation helpers.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
