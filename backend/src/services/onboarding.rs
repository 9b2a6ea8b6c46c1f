//! Birth-data onboarding flow
//!
//! Orchestrates timezone resolution, zoned instant construction, natal
//! chart computation, runtime state population, and persistence. A chart
//! engine failure degrades to a record without a chart; a persistence
//! failure is reported alongside the computed record rather than erasing it.

use std::sync::Arc;

use chrono::{NaiveDateTime, Offset, SecondsFormat, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;
use shared::models::{BirthRecord, ChartSnapshot};
use shared::types::SelectedLocation;
use shared::validation::{
    validate_date_shape, validate_latitude, validate_longitude, validate_required_text,
    validate_time_shape,
};
use uuid::Uuid;

use crate::astro::ChartEngine;
use crate::error::{AppError, AppResult};
use crate::services::{AstrologyDataManager, TimezoneResolver};
use crate::storage::ProfileStore;

/// Onboarding form payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthDataSubmission {
    pub full_name: String,

    /// `YYYY-MM-DD`, wall-clock at the birth place.
    pub birth_date: String,

    /// `HH:MM`, 24-hour, wall-clock at the birth place.
    pub birth_time: String,

    /// Place picked from location search; required.
    pub location: Option<SelectedLocation>,
}

/// Result of a submission. `save_error` is set when everything up to
/// persistence succeeded but the profile store write failed; the record is
/// still returned so the caller can show what was computed.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub record: BirthRecord,
    pub save_error: Option<AppError>,
}

pub struct OnboardingService {
    resolver: TimezoneResolver,
    engine: Arc<dyn ChartEngine>,
    manager: Arc<AstrologyDataManager>,
    profiles: Arc<dyn ProfileStore>,
}

impl OnboardingService {
    pub fn new(
        resolver: TimezoneResolver,
        engine: Arc<dyn ChartEngine>,
        manager: Arc<AstrologyDataManager>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            resolver,
            engine,
            manager,
            profiles,
        }
    }

    /// Submit birth data for a user, producing the canonical [`BirthRecord`].
    pub async fn submit_birth_data(
        &self,
        user_id: Uuid,
        submission: BirthDataSubmission,
    ) -> AppResult<SubmissionOutcome> {
        let location = Self::validate(&submission)?;

        let timezone_id = self
            .resolver
            .resolve(location.latitude, location.longitude)
            .await;

        let (zoned, tz) = Self::zoned_birth_instant(
            &submission.birth_date,
            &submission.birth_time,
            &timezone_id,
        )?;
        let utc_offset_hours = zoned.offset().fix().local_minus_utc() as f64 / 3600.0;

        let natal_chart = match self.engine.compute_chart(
            zoned.with_timezone(&chrono::Utc),
            location.latitude,
            location.longitude,
        ) {
            Ok(chart) => Some(chart),
            Err(e) => {
                // Degraded mode: the record is still saved without a chart.
                tracing::error!("Natal chart computation failed: {}", e);
                None
            }
        };

        if let Some(chart) = &natal_chart {
            self.manager.set_natal_chart(chart.clone());
            if let Err(e) = self
                .manager
                .generate_transit_chart(location.latitude, location.longitude)
            {
                tracing::warn!("Initial transit chart generation failed: {}", e);
            }
        }

        let record = BirthRecord {
            user_id,
            full_name: submission.full_name.trim().to_string(),
            birth_place: location.label.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            timezone_id: tz.name().to_string(),
            birth_date_time_local: zoned.naive_local(),
            birth_date_time_iso: zoned.to_rfc3339_opts(SecondsFormat::Secs, true),
            utc_offset_hours,
            natal_chart,
        };

        let save_error = self.profiles.upsert_birth_record(&record).await.err();
        if let Some(e) = &save_error {
            tracing::error!("Failed to persist birth record: {}", e);
        }

        Ok(SubmissionOutcome { record, save_error })
    }

    /// Reload a user's record at session start and re-populate the runtime
    /// state without recomputing the natal chart.
    pub async fn load_session(&self, user_id: Uuid) -> AppResult<Option<BirthRecord>> {
        let record = self.profiles.fetch_birth_record(user_id).await?;

        if let Some(record) = &record {
            if let Some(chart) = &record.natal_chart {
                self.manager.set_natal_chart(chart.clone());
            }
        }

        Ok(record)
    }

    /// Recompute the transit chart for the current instant at the user's
    /// stored birth location. The transit chart is always tied to the natal
    /// location; callers never supply coordinates of their own.
    pub async fn refresh_transit_chart(&self, user_id: Uuid) -> AppResult<ChartSnapshot> {
        let record = self
            .profiles
            .fetch_birth_record(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Birth record".to_string()))?;

        self.manager
            .generate_transit_chart(record.latitude, record.longitude)
    }

    fn validate(submission: &BirthDataSubmission) -> AppResult<&SelectedLocation> {
        let field_error = |field: &str, message: &str| AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        };

        validate_required_text(&submission.full_name)
            .map_err(|m| field_error("fullName", m))?;
        validate_required_text(&submission.birth_date)
            .and_then(|_| validate_date_shape(&submission.birth_date))
            .map_err(|m| field_error("birthDate", m))?;
        validate_required_text(&submission.birth_time)
            .and_then(|_| validate_time_shape(&submission.birth_time))
            .map_err(|m| field_error("birthTime", m))?;

        let location = submission
            .location
            .as_ref()
            .ok_or_else(|| field_error("location", "A birth location must be selected"))?;
        validate_latitude(location.latitude).map_err(|m| field_error("location", m))?;
        validate_longitude(location.longitude).map_err(|m| field_error("location", m))?;

        Ok(location)
    }

    /// Interpret the composed date and time as wall-clock in the resolved
    /// timezone. The offset reflects DST rules at that historical instant.
    fn zoned_birth_instant(
        date: &str,
        time: &str,
        timezone_id: &str,
    ) -> AppResult<(chrono::DateTime<Tz>, Tz)> {
        let composed = format!("{}T{}", date, time);
        let naive = NaiveDateTime::parse_from_str(&composed, "%Y-%m-%dT%H:%M")
            .map_err(|_| AppError::InvalidDateTime(composed.clone()))?;

        let tz: Tz = timezone_id
            .parse()
            .map_err(|_| AppError::Internal(format!("Unresolvable timezone {}", timezone_id)))?;

        // Ambiguous times (DST fold) take the earlier offset; nonexistent
        // times (DST gap) are rejected.
        let zoned = tz
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| AppError::InvalidDateTime(composed))?;

        Ok((zoned, tz))
    }
}
