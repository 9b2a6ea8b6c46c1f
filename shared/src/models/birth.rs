//! Birth record: the durable per-user entity produced by onboarding.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chart::ChartSnapshot;

/// One user's birth data plus the natal chart computed from it.
///
/// Created on first successful onboarding submission, read on every session
/// start, overwritten wholesale on edit. Never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthRecord {
    pub user_id: Uuid,

    pub full_name: String,

    /// Free-text label of the birth place as the user selected it.
    pub birth_place: String,

    /// Decimal degrees, `[-90, 90]`.
    pub latitude: f64,

    /// Decimal degrees, `[-180, 180]`.
    pub longitude: f64,

    /// Resolved IANA identifier or synthetic `Etc/GMT±N` / `UTC`.
    pub timezone_id: String,

    /// Wall-clock local birth time as entered, no zone attached.
    pub birth_date_time_local: NaiveDateTime,

    /// Zoned ISO-8601 instant: local time combined with the timezone offset
    /// in effect at that historical instant.
    pub birth_date_time_iso: String,

    /// Signed offset from UTC at the birth instant; may be fractional
    /// (e.g. 5.5 for India).
    pub utc_offset_hours: f64,

    /// Natal chart computed once at onboarding. `None` when the chart
    /// engine failed and the record was saved in degraded mode.
    pub natal_chart: Option<ChartSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_record_serializes_camel_case() {
        let record = BirthRecord {
            user_id: Uuid::nil(),
            full_name: "Ada Lovelace".to_string(),
            birth_place: "London, United Kingdom".to_string(),
            latitude: 51.5074,
            longitude: -0.1278,
            timezone_id: "Europe/London".to_string(),
            birth_date_time_local: NaiveDate::from_ymd_opt(1990, 6, 15)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            birth_date_time_iso: "1990-06-15T08:30:00+01:00".to_string(),
            utc_offset_hours: 1.0,
            natal_chart: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("fullName").is_some());
        assert!(json.get("birthDateTimeIso").is_some());
        assert!(json.get("utcOffsetHours").is_some());
        assert!(json.get("full_name").is_none());

        let back: BirthRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
