//! Low-precision mean-element ephemeris
//!
//! Geocentric ecliptic longitudes from Keplerian mean elements (Standish,
//! "Keplerian Elements for Approximate Positions of the Major Planets",
//! J2000 table, valid 1800-2050), plus short mean-longitude series for the
//! Sun and Moon. Houses use the equal-house system anchored on the
//! ascendant.

use chrono::{DateTime, Utc};
use shared::models::{body_key, BodyPosition, ChartSnapshot, KEY_ASCENDANT, KEY_MIDHEAVEN};

use crate::error::{AppError, AppResult};

use super::ChartEngine;

/// Days per Julian century.
const DAYS_PER_CENTURY: f64 = 36525.0;

/// Keplerian elements at J2000 with per-century rates.
struct PlanetElements {
    label: &'static str,
    /// Semi-major axis, AU.
    a: (f64, f64),
    /// Eccentricity.
    e: (f64, f64),
    /// Inclination, degrees.
    i: (f64, f64),
    /// Mean longitude, degrees.
    l: (f64, f64),
    /// Longitude of perihelion, degrees.
    peri: (f64, f64),
    /// Longitude of the ascending node, degrees.
    node: (f64, f64),
}

const PLANETS: [PlanetElements; 9] = [
    PlanetElements {
        label: "Mercury",
        a: (0.38709927, 0.00000037),
        e: (0.20563593, 0.00001906),
        i: (7.00497902, -0.00594749),
        l: (252.25032350, 149472.67411175),
        peri: (77.45779628, 0.16047689),
        node: (48.33076593, -0.12534081),
    },
    PlanetElements {
        label: "Venus",
        a: (0.72333566, 0.00000390),
        e: (0.00677672, -0.00004107),
        i: (3.39467605, -0.00078890),
        l: (181.97909950, 58517.81538729),
        peri: (131.60246718, 0.00268329),
        node: (76.67984255, -0.27769418),
    },
    // Earth-Moon barycenter, used as the observer position.
    PlanetElements {
        label: "Earth",
        a: (1.00000261, 0.00000562),
        e: (0.01671123, -0.00004392),
        i: (-0.00001531, -0.01294668),
        l: (100.46457166, 35999.37244981),
        peri: (102.93768193, 0.32327364),
        node: (0.0, 0.0),
    },
    PlanetElements {
        label: "Mars",
        a: (1.52371034, 0.00001847),
        e: (0.09339410, 0.00007882),
        i: (1.84969142, -0.00813131),
        l: (-4.55343205, 19140.30268499),
        peri: (-23.94362959, 0.44441088),
        node: (49.55953891, -0.29257343),
    },
    PlanetElements {
        label: "Jupiter",
        a: (5.20288700, -0.00011607),
        e: (0.04838624, -0.00013253),
        i: (1.30439695, -0.00183714),
        l: (34.39644051, 3034.74612775),
        peri: (14.72847983, 0.21252668),
        node: (100.47390909, 0.20469106),
    },
    PlanetElements {
        label: "Saturn",
        a: (9.53667594, -0.00125060),
        e: (0.05386179, -0.00050991),
        i: (2.48599187, 0.00193609),
        l: (49.95424423, 1222.49362201),
        peri: (92.59887831, -0.41897216),
        node: (113.66242448, -0.28867794),
    },
    PlanetElements {
        label: "Uranus",
        a: (19.18916464, -0.00196176),
        e: (0.04725744, -0.00004397),
        i: (0.77263783, -0.00242939),
        l: (313.23810451, 428.48202785),
        peri: (170.95427630, 0.40805281),
        node: (74.01692503, 0.04240589),
    },
    PlanetElements {
        label: "Neptune",
        a: (30.06992276, 0.00026291),
        e: (0.00859048, 0.00005105),
        i: (1.77004347, 0.00035372),
        l: (-55.12002969, 218.45945325),
        peri: (44.96476227, -0.32241464),
        node: (131.78422574, -0.00508664),
    },
    PlanetElements {
        label: "Pluto",
        a: (39.48211675, -0.00031596),
        e: (0.24882730, 0.00005170),
        i: (17.14001206, 0.00004818),
        l: (238.92903833, 145.20780515),
        peri: (224.06891629, -0.04062942),
        node: (110.30393684, -0.01183482),
    },
];

/// Days since the J2000.0 epoch (2000-01-01 12:00 TT, treated as UTC here).
fn days_since_j2000(instant: DateTime<Utc>) -> f64 {
    let jd = 2440587.5 + instant.timestamp_millis() as f64 / 86_400_000.0;
    jd - 2451545.0
}

/// Wrap a degree difference into (-180, 180].
fn signed_wrap(delta: f64) -> f64 {
    180.0 - (180.0 - delta).rem_euclid(360.0)
}

/// Solve Kepler's equation E - e sin E = M (degrees) by Newton iteration.
fn solve_kepler(mean_anomaly_deg: f64, eccentricity: f64) -> f64 {
    let m = signed_wrap(mean_anomaly_deg);
    let e_star = eccentricity.to_degrees();
    let mut ecc_anomaly = m + e_star * m.to_radians().sin();
    for _ in 0..20 {
        let delta_m = m - (ecc_anomaly - e_star * ecc_anomaly.to_radians().sin());
        let delta_e = delta_m / (1.0 - eccentricity * ecc_anomaly.to_radians().cos());
        ecc_anomaly += delta_e;
        if delta_e.abs() < 1e-8 {
            break;
        }
    }
    ecc_anomaly
}

/// Heliocentric ecliptic position (x, y, z) in AU at `t` Julian centuries.
fn heliocentric_position(p: &PlanetElements, t: f64) -> (f64, f64, f64) {
    let a = p.a.0 + p.a.1 * t;
    let e = p.e.0 + p.e.1 * t;
    let i = (p.i.0 + p.i.1 * t).to_radians();
    let l = p.l.0 + p.l.1 * t;
    let peri = p.peri.0 + p.peri.1 * t;
    let node = (p.node.0 + p.node.1 * t).to_radians();

    let arg_peri = (peri - p.node.0 - p.node.1 * t).to_radians();
    let ecc_anomaly = solve_kepler(l - peri, e).to_radians();

    // Position in the orbital plane.
    let xp = a * (ecc_anomaly.cos() - e);
    let yp = a * (1.0 - e * e).sqrt() * ecc_anomaly.sin();

    // Rotate through argument of perihelion, inclination, ascending node.
    let (cw, sw) = (arg_peri.cos(), arg_peri.sin());
    let (co, so) = (node.cos(), node.sin());
    let ci = i.cos();

    let x = (cw * co - sw * so * ci) * xp + (-sw * co - cw * so * ci) * yp;
    let y = (cw * so + sw * co * ci) * xp + (-sw * so + cw * co * ci) * yp;
    let z = (sw * i.sin()) * xp + (cw * i.sin()) * yp;
    (x, y, z)
}

/// Geocentric ecliptic longitude of planet index `idx` in PLANETS.
fn planet_longitude(idx: usize, d: f64) -> f64 {
    let t = d / DAYS_PER_CENTURY;
    let (px, py, _) = heliocentric_position(&PLANETS[idx], t);
    let (ex, ey, _) = heliocentric_position(&PLANETS[2], t);
    (py - ey).atan2(px - ex).to_degrees().rem_euclid(360.0)
}

/// Geocentric ecliptic longitude of the Sun (mean elements plus the
/// equation of center).
fn sun_longitude(d: f64) -> f64 {
    let mean_longitude = 280.460 + 0.9856474 * d;
    let mean_anomaly = (357.528 + 0.9856003 * d).to_radians();
    (mean_longitude + 1.915 * mean_anomaly.sin() + 0.020 * (2.0 * mean_anomaly).sin())
        .rem_euclid(360.0)
}

/// Geocentric ecliptic longitude of the Moon (principal terms only).
fn moon_longitude(d: f64) -> f64 {
    let mean_longitude = 218.316 + 13.176396 * d;
    let mean_anomaly = (134.963 + 13.064993 * d).to_radians();
    (mean_longitude + 6.289 * mean_anomaly.sin()).rem_euclid(360.0)
}

/// Mean longitude of the ascending lunar node.
fn north_node_longitude(d: f64) -> f64 {
    (125.04452 - 0.05295377 * d).rem_euclid(360.0)
}

/// Mean obliquity of the ecliptic, degrees.
fn obliquity(d: f64) -> f64 {
    23.4393 - 3.563e-7 * d
}

/// Greenwich mean sidereal time, degrees.
fn gmst_degrees(d: f64) -> f64 {
    (280.46061837 + 360.98564736629 * d).rem_euclid(360.0)
}

/// Ascendant and midheaven longitudes for an instant and location.
fn angles(d: f64, latitude: f64, longitude: f64) -> (f64, f64) {
    // tan(lat) diverges at the poles; house angles are ill-defined there
    // anyway, so clamp just short of them.
    let lat = latitude.clamp(-89.999, 89.999).to_radians();
    let eps = obliquity(d).to_radians();
    let ramc = (gmst_degrees(d) + longitude).rem_euclid(360.0).to_radians();

    let mc = ramc.sin().atan2(ramc.cos() * eps.cos()).to_degrees();
    let asc = ramc
        .cos()
        .atan2(-(ramc.sin() * eps.cos() + lat.tan() * eps.sin()))
        .to_degrees();

    (asc.rem_euclid(360.0), mc.rem_euclid(360.0))
}

/// Equal-house placement: twelve 30-degree houses anchored on the ascendant.
fn equal_house(body_longitude: f64, ascendant: f64) -> u8 {
    let offset = (body_longitude - ascendant).rem_euclid(360.0);
    (offset / 30.0) as u8 % 12 + 1
}

/// The default chart engine.
pub struct MeanElementsEngine;

impl MeanElementsEngine {
    pub fn new() -> Self {
        MeanElementsEngine
    }
}

impl Default for MeanElementsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartEngine for MeanElementsEngine {
    fn compute_chart(
        &self,
        instant: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<ChartSnapshot> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::Computation(format!(
                "latitude {} out of range [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Computation(format!(
                "longitude {} out of range [-180, 180]",
                longitude
            )));
        }

        let d = days_since_j2000(instant);
        let (asc, mc) = angles(d, latitude, longitude);

        let mut snapshot = ChartSnapshot::new();

        let sun = sun_longitude(d);
        snapshot.insert(
            "Sun",
            BodyPosition::from_longitude(sun, Some(equal_house(sun, asc)), false),
        );

        let moon = moon_longitude(d);
        snapshot.insert(
            "Moon",
            BodyPosition::from_longitude(moon, Some(equal_house(moon, asc)), false),
        );

        for (idx, planet) in PLANETS.iter().enumerate() {
            if planet.label == "Earth" {
                continue;
            }
            let lon_now = planet_longitude(idx, d);
            // Apparent motion over one day decides retrograde status.
            let lon_next = planet_longitude(idx, d + 1.0);
            let retrograde = signed_wrap(lon_next - lon_now) < 0.0;
            snapshot.insert(
                planet.label,
                BodyPosition::from_longitude(
                    lon_now,
                    Some(equal_house(lon_now, asc)),
                    retrograde,
                ),
            );
        }

        let node = north_node_longitude(d);
        snapshot.insert(
            "North Node",
            BodyPosition::from_longitude(node, Some(equal_house(node, asc)), false),
        );
        // The south node is always the antipode of the north node.
        let south = (node + 180.0).rem_euclid(360.0);
        snapshot.insert(
            "South Node",
            BodyPosition::from_longitude(south, Some(equal_house(south, asc)), false),
        );

        // Angles are pinned to their houses by convention.
        snapshot.insert(KEY_ASCENDANT, BodyPosition::from_longitude(asc, Some(1), false));
        snapshot.insert(KEY_MIDHEAVEN, BodyPosition::from_longitude(mc, Some(10), false));

        debug_assert!(snapshot.contains(&body_key("Ascendant")));

        Ok(snapshot)
    }
}
