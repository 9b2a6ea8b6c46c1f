//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// A place picked from location search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedLocation {
    /// Decimal degrees, `[-90, 90]`.
    pub latitude: f64,
    /// Decimal degrees, `[-180, 180]`.
    pub longitude: f64,
    /// Human-readable label, e.g. "Paris, France".
    pub label: String,
}

impl SelectedLocation {
    pub fn new(latitude: f64, longitude: f64, label: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            label: label.into(),
        }
    }
}
