//! Birth-data onboarding integration tests
//!
//! Covers validation short-circuits, degraded chart computation, historical
//! DST offsets, persistence failure reporting, and the read-back round trip.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use astral_backend::astro::{ChartEngine, MeanElementsEngine};
use astral_backend::error::{AppError, AppResult};
use astral_backend::external::{TimezoneApi, TimezoneLookup};
use astral_backend::services::{
    AstrologyDataManager, BirthDataSubmission, OnboardingService, TimezoneResolver,
};
use astral_backend::storage::ProfileStore;
use shared::models::{BirthRecord, ChartSnapshot};
use shared::types::SelectedLocation;

// ============================================================================
// Scripted collaborators
// ============================================================================

struct ScriptedTimezoneApi {
    result: Option<&'static str>,
}

#[async_trait]
impl TimezoneApi for ScriptedTimezoneApi {
    async fn lookup(&self, _latitude: f64, _longitude: f64) -> AppResult<TimezoneLookup> {
        match self.result {
            Some(id) => Ok(TimezoneLookup {
                timezone_id: id.to_string(),
            }),
            None => Err(AppError::Timeout),
        }
    }
}

struct CountingEngine {
    inner: MeanElementsEngine,
    calls: AtomicUsize,
    coords: Mutex<Vec<(f64, f64)>>,
    fail: bool,
}

impl CountingEngine {
    fn working() -> Self {
        Self {
            inner: MeanElementsEngine::new(),
            calls: AtomicUsize::new(0),
            coords: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            inner: MeanElementsEngine::new(),
            calls: AtomicUsize::new(0),
            coords: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_coords(&self) -> Option<(f64, f64)> {
        self.coords.lock().unwrap().last().copied()
    }
}

impl ChartEngine for CountingEngine {
    fn compute_chart(
        &self,
        instant: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<ChartSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.coords.lock().unwrap().push((latitude, longitude));
        if self.fail {
            return Err(AppError::Computation("ephemeris unavailable".to_string()));
        }
        self.inner.compute_chart(instant, latitude, longitude)
    }
}

#[derive(Default)]
struct RecordingProfileStore {
    records: Mutex<Vec<BirthRecord>>,
    fail: bool,
}

impl RecordingProfileStore {
    fn working() -> Self {
        Self::default()
    }

    fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn upserts(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn last(&self) -> Option<BirthRecord> {
        self.records.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ProfileStore for RecordingProfileStore {
    async fn upsert_birth_record(&self, record: &BirthRecord) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Persistence("disk full".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn fetch_birth_record(&self, user_id: Uuid) -> AppResult<Option<BirthRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.user_id == user_id)
            .cloned())
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Harness {
    service: OnboardingService,
    engine: Arc<CountingEngine>,
    store: Arc<RecordingProfileStore>,
    manager: Arc<AstrologyDataManager>,
}

fn harness(
    timezone: Option<&'static str>,
    engine: CountingEngine,
    store: RecordingProfileStore,
) -> Harness {
    let engine = Arc::new(engine);
    let store = Arc::new(store);
    let manager = Arc::new(AstrologyDataManager::new(engine.clone()));
    let resolver = TimezoneResolver::new(Arc::new(ScriptedTimezoneApi { result: timezone }));
    let service = OnboardingService::new(resolver, engine.clone(), manager.clone(), store.clone());
    Harness {
        service,
        engine,
        store,
        manager,
    }
}

fn submission() -> BirthDataSubmission {
    BirthDataSubmission {
        full_name: "Ada Lovelace".to_string(),
        birth_date: "1990-06-15".to_string(),
        birth_time: "08:30".to_string(),
        location: Some(SelectedLocation::new(
            40.7128,
            -74.0060,
            "New York, United States",
        )),
    }
}

// ============================================================================
// Validation short-circuits
// ============================================================================

#[tokio::test]
async fn test_blank_name_fails_validation() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::working());

    let mut sub = submission();
    sub.full_name = "   ".to_string();

    let result = h.service.submit_birth_data(Uuid::new_v4(), sub).await;
    assert!(matches!(result, Err(AppError::Validation { ref field, .. }) if field == "fullName"));
    assert_eq!(h.engine.calls(), 0);
    assert_eq!(h.store.upserts(), 0);
}

#[tokio::test]
async fn test_missing_location_fails_validation() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::working());

    let mut sub = submission();
    sub.location = None;

    let result = h.service.submit_birth_data(Uuid::new_v4(), sub).await;
    assert!(matches!(result, Err(AppError::Validation { ref field, .. }) if field == "location"));
}

#[tokio::test]
async fn test_impossible_calendar_date_fails_without_side_effects() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::working());

    let mut sub = submission();
    sub.birth_date = "2024-02-30".to_string();

    let result = h.service.submit_birth_data(Uuid::new_v4(), sub).await;
    assert!(matches!(result, Err(AppError::InvalidDateTime(_))));
    // Neither the chart engine nor the profile store was reached.
    assert_eq!(h.engine.calls(), 0);
    assert_eq!(h.store.upserts(), 0);
}

#[tokio::test]
async fn test_nonexistent_dst_gap_time_is_rejected() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::working());

    // 2:30 AM on the 2024 spring-forward date does not exist.
    let mut sub = submission();
    sub.birth_date = "2024-03-10".to_string();
    sub.birth_time = "02:30".to_string();

    let result = h.service.submit_birth_data(Uuid::new_v4(), sub).await;
    assert!(matches!(result, Err(AppError::InvalidDateTime(_))));
}

// ============================================================================
// Degraded modes
// ============================================================================

#[tokio::test]
async fn test_engine_failure_still_persists_record_without_chart() {
    let h = harness(Some("America/New_York"), CountingEngine::failing(), RecordingProfileStore::working());

    let outcome = h
        .service
        .submit_birth_data(Uuid::new_v4(), submission())
        .await
        .unwrap();

    assert!(outcome.save_error.is_none());
    assert!(outcome.record.natal_chart.is_none());

    let saved = h.store.last().unwrap();
    assert!(saved.natal_chart.is_none());
    assert!(h.manager.natal_chart().is_none());
}

#[tokio::test]
async fn test_persistence_failure_still_returns_computed_record() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::failing());

    let outcome = h
        .service
        .submit_birth_data(Uuid::new_v4(), submission())
        .await
        .unwrap();

    assert!(matches!(outcome.save_error, Some(AppError::Persistence(_))));
    assert!(outcome.record.natal_chart.is_some());
    // The runtime state was still populated for the current session.
    assert!(h.manager.natal_chart().is_some());
}

// ============================================================================
// Timezone and offset semantics
// ============================================================================

#[tokio::test]
async fn test_historical_dst_offset_is_used() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::working());

    // June: eastern daylight time, UTC-4.
    let outcome = h
        .service
        .submit_birth_data(Uuid::new_v4(), submission())
        .await
        .unwrap();
    assert_eq!(outcome.record.utc_offset_hours, -4.0);

    // January of the same year: eastern standard time, UTC-5.
    let mut winter = submission();
    winter.birth_date = "1990-01-15".to_string();
    let outcome = h
        .service
        .submit_birth_data(Uuid::new_v4(), winter)
        .await
        .unwrap();
    assert_eq!(outcome.record.utc_offset_hours, -5.0);
}

#[tokio::test]
async fn test_lookup_failure_falls_back_to_estimate() {
    let h = harness(None, CountingEngine::working(), RecordingProfileStore::working());

    let outcome = h
        .service
        .submit_birth_data(Uuid::new_v4(), submission())
        .await
        .unwrap();

    // New York sits inside the North America box.
    assert_eq!(outcome.record.timezone_id, "America/New_York");
}

#[tokio::test]
async fn test_unknown_remote_timezone_falls_back_to_estimate() {
    let h = harness(Some("Not/AZone"), CountingEngine::working(), RecordingProfileStore::working());

    let outcome = h
        .service
        .submit_birth_data(Uuid::new_v4(), submission())
        .await
        .unwrap();

    assert_eq!(outcome.record.timezone_id, "America/New_York");
}

#[tokio::test]
async fn test_fractional_offset_timezone() {
    let h = harness(Some("Asia/Kolkata"), CountingEngine::working(), RecordingProfileStore::working());

    let mut sub = submission();
    sub.location = Some(SelectedLocation::new(19.0760, 72.8777, "Mumbai, India"));

    let outcome = h
        .service
        .submit_birth_data(Uuid::new_v4(), sub)
        .await
        .unwrap();
    assert_eq!(outcome.record.utc_offset_hours, 5.5);
}

// ============================================================================
// Round trip and session reload
// ============================================================================

#[tokio::test]
async fn test_round_trip_reproduces_record() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::working());
    let user_id = Uuid::new_v4();

    let outcome = h
        .service
        .submit_birth_data(user_id, submission())
        .await
        .unwrap();
    let written = outcome.record;

    let read_back = h.service.load_session(user_id).await.unwrap().unwrap();

    assert_eq!(read_back.latitude, written.latitude);
    assert_eq!(read_back.longitude, written.longitude);
    assert_eq!(read_back.timezone_id, written.timezone_id);
    assert_eq!(read_back.birth_date_time_iso, written.birth_date_time_iso);

    // Sign and house placement must agree exactly; degrees to fp tolerance.
    let natal_written = written.natal_chart.unwrap();
    let natal_read = read_back.natal_chart.unwrap();
    for (key, pos) in natal_written.iter() {
        let other = natal_read.get(key).unwrap();
        assert_eq!(other.sign, pos.sign, "{}", key);
        assert_eq!(other.house, pos.house, "{}", key);
        assert!((other.degree_in_sign - pos.degree_in_sign).abs() < 1e-9, "{}", key);
    }
}

#[tokio::test]
async fn test_session_reload_populates_manager_without_recompute() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::working());
    let user_id = Uuid::new_v4();

    h.service
        .submit_birth_data(user_id, submission())
        .await
        .unwrap();
    // Natal computation plus the initial transit generation.
    let calls_after_submit = h.engine.calls();

    h.manager.clear();
    assert!(h.manager.natal_chart().is_none());

    h.service.load_session(user_id).await.unwrap();

    assert!(h.manager.natal_chart().is_some());
    assert_eq!(h.engine.calls(), calls_after_submit);
}

#[tokio::test]
async fn test_refresh_transit_uses_stored_birth_coordinates() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::working());
    let user_id = Uuid::new_v4();

    h.service
        .submit_birth_data(user_id, submission())
        .await
        .unwrap();

    let refreshed = h.service.refresh_transit_chart(user_id).await.unwrap();

    // Recomputed at the persisted birth location, not caller-supplied ones.
    assert_eq!(h.engine.last_coords(), Some((40.7128, -74.0060)));
    assert_eq!(h.manager.transit_chart().unwrap(), refreshed);
}

#[tokio::test]
async fn test_refresh_transit_for_unknown_user() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::working());

    let result = h.service.refresh_transit_chart(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(h.engine.calls(), 0);
}

#[tokio::test]
async fn test_load_session_for_unknown_user() {
    let h = harness(Some("America/New_York"), CountingEngine::working(), RecordingProfileStore::working());
    assert!(h.service.load_session(Uuid::new_v4()).await.unwrap().is_none());
    assert!(h.manager.natal_chart().is_none());
}
