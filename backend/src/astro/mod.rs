//! Chart computation
//!
//! The [`ChartEngine`] trait is the seam between the orchestration layer and
//! the planetary-position math, so services can be tested against scripted
//! engines. The default implementation is a low-precision mean-element
//! ephemeris good to a fraction of a degree over the modern era, which is
//! ample for sign and house placement.

pub mod ephemeris;

pub use ephemeris::MeanElementsEngine;

use chrono::{DateTime, Utc};
use shared::models::ChartSnapshot;

use crate::error::AppResult;

/// Computes a chart snapshot for an absolute instant and location.
///
/// Deterministic: identical inputs produce identical output. Fails with
/// [`crate::error::AppError::Computation`] on out-of-range coordinates.
pub trait ChartEngine: Send + Sync {
    fn compute_chart(
        &self,
        instant: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<ChartSnapshot>;
}
