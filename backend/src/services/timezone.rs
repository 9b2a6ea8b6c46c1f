//! Timezone resolution
//!
//! Remote reverse-lookup with a deterministic geometric fallback. Resolution
//! never fails: every coordinate pair maps to some usable identifier, and
//! lookup errors are absorbed, not propagated.

use std::sync::Arc;

use chrono_tz::Tz;

use crate::external::TimezoneApi;

struct RegionBox {
    lat: (f64, f64),
    lon: (f64, f64),
    timezone_id: &'static str,
}

// Hand-tuned boxes for densely used regions where the longitude estimate
// would be noticeably wrong. Checked in order, first match wins.
const REGION_BOXES: [RegionBox; 4] = [
    RegionBox {
        lat: (35.0, 70.0),
        lon: (-10.0, 40.0),
        timezone_id: "Europe/Moscow",
    },
    RegionBox {
        lat: (25.0, 50.0),
        lon: (-125.0, -65.0),
        timezone_id: "America/New_York",
    },
    RegionBox {
        lat: (30.0, 45.0),
        lon: (100.0, 145.0),
        timezone_id: "Asia/Tokyo",
    },
    RegionBox {
        lat: (-45.0, -10.0),
        lon: (110.0, 155.0),
        timezone_id: "Australia/Sydney",
    },
];

/// Deterministic timezone estimate from coordinates alone.
///
/// Falls through the region boxes to a longitude-derived `Etc/GMT` zone.
/// The `Etc/GMT` family uses POSIX sign convention: a zone east of
/// Greenwich (positive offset) is spelled `Etc/GMT-N`. That inversion is
/// deliberate and load-bearing; `Etc/GMT-3` means UTC+3.
pub fn estimate_timezone_id(latitude: f64, longitude: f64) -> String {
    for region in &REGION_BOXES {
        if latitude >= region.lat.0
            && latitude <= region.lat.1
            && longitude >= region.lon.0
            && longitude <= region.lon.1
        {
            return region.timezone_id.to_string();
        }
    }

    let offset_hours = (longitude / 15.0).round() as i32;
    if (-12..=14).contains(&offset_hours) {
        let sign = if offset_hours <= 0 { '+' } else { '-' };
        format!("Etc/GMT{}{}", sign, offset_hours.abs())
    } else {
        "UTC".to_string()
    }
}

/// Remote-first timezone resolver.
pub struct TimezoneResolver {
    api: Arc<dyn TimezoneApi>,
}

impl TimezoneResolver {
    pub fn new(api: Arc<dyn TimezoneApi>) -> Self {
        Self { api }
    }

    /// Resolve coordinates to a timezone identifier. Never fails.
    ///
    /// A remote identifier is only accepted when it names a zone this
    /// process can actually load; anything else falls back to the estimate.
    pub async fn resolve(&self, latitude: f64, longitude: f64) -> String {
        match self.api.lookup(latitude, longitude).await {
            Ok(lookup) if lookup.timezone_id.parse::<Tz>().is_ok() => lookup.timezone_id,
            Ok(lookup) => {
                tracing::warn!(
                    timezone_id = %lookup.timezone_id,
                    "Remote returned unknown timezone, using estimate"
                );
                estimate_timezone_id(latitude, longitude)
            }
            Err(e) => {
                tracing::warn!("Timezone lookup failed, using estimate: {}", e);
                estimate_timezone_id(latitude, longitude)
            }
        }
    }
}
