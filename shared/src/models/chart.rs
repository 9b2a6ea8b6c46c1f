//! Chart snapshot types: the structured result of one chart computation.
//!
//! A [`ChartSnapshot`] maps a normalized celestial-body key (`sun`, `moon`,
//! `ascendant`, `northnode`, ...) to a [`BodyPosition`]. Keys are lower-cased,
//! whitespace-stripped body labels, so `"North Node"` becomes `northnode`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The twelve tropical zodiac signs, in ecliptic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// All signs in ecliptic order (Aries = 0° .. Pisces = 330°).
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Display label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    /// Sign containing the given ecliptic longitude (degrees, any range).
    pub fn from_longitude(longitude: f64) -> ZodiacSign {
        let normalized = longitude.rem_euclid(360.0);
        let index = (normalized / 30.0) as usize;
        Self::ALL[index.min(11)]
    }
}

/// Sexagesimal decomposition of a degree value within a sign.
///
/// `degrees` is 0-29; `minutes` and `seconds` are 0-59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcDegrees {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl ArcDegrees {
    /// Decompose a decimal in-sign degree value (`0.0 <= value < 30.0`).
    pub fn from_decimal(value: f64) -> ArcDegrees {
        let value = value.rem_euclid(30.0);
        let degrees = value.floor();
        let minutes_f = (value - degrees) * 60.0;
        let minutes = minutes_f.floor();
        let seconds = ((minutes_f - minutes) * 60.0).floor();
        ArcDegrees {
            degrees: degrees as u32,
            minutes: minutes as u32,
            seconds: (seconds as u32).min(59),
        }
    }
}

/// Position of a single celestial body or derived point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPosition {
    /// Zodiac sign containing the body.
    pub sign: ZodiacSign,

    /// Decimal degrees within the sign, `0.0 <= degree_in_sign < 30.0`.
    pub degree_in_sign: f64,

    /// Sexagesimal decomposition of `degree_in_sign`.
    pub arc_degrees: ArcDegrees,

    /// House placement 1-12, absent for points without one.
    pub house: Option<u8>,

    /// Retrograde apparent motion; `false` when not applicable
    /// (luminaries and derived points).
    pub is_retrograde: bool,
}

impl BodyPosition {
    /// Build a position from an absolute ecliptic longitude (degrees).
    pub fn from_longitude(longitude: f64, house: Option<u8>, is_retrograde: bool) -> BodyPosition {
        let normalized = longitude.rem_euclid(360.0);
        let degree_in_sign = normalized % 30.0;
        BodyPosition {
            sign: ZodiacSign::from_longitude(normalized),
            degree_in_sign,
            arc_degrees: ArcDegrees::from_decimal(degree_in_sign),
            house,
            is_retrograde,
        }
    }
}

/// Well-known snapshot keys for the derived angle points.
pub const KEY_ASCENDANT: &str = "ascendant";
pub const KEY_MIDHEAVEN: &str = "midheaven";

/// Normalize a body label into a snapshot key: lower-cased with all
/// whitespace stripped (`"North Node"` -> `northnode`).
pub fn body_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// A full chart: body key -> position.
///
/// Serializes transparently as a JSON object keyed by body, matching the
/// wire format consumed by the forecast interpretation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartSnapshot {
    bodies: BTreeMap<String, BodyPosition>,
}

impl ChartSnapshot {
    pub fn new() -> ChartSnapshot {
        ChartSnapshot::default()
    }

    /// Insert a body under its normalized label.
    pub fn insert(&mut self, label: &str, position: BodyPosition) {
        self.bodies.insert(body_key(label), position);
    }

    pub fn get(&self, key: &str) -> Option<&BodyPosition> {
        self.bodies.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.bodies.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BodyPosition)> {
        self.bodies.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
