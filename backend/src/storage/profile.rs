//! Birth record persistence
//!
//! Single-row-per-user upsert semantics with read-after-write consistency.
//! The natal chart is stored alongside the record as JSONB so a session
//! restart never recomputes it.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::{BirthRecord, ChartSnapshot};

use crate::error::{AppError, AppResult};

/// Birth record persistence capability.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn upsert_birth_record(&self, record: &BirthRecord) -> AppResult<()>;

    async fn fetch_birth_record(&self, user_id: Uuid) -> AppResult<Option<BirthRecord>>;
}

#[derive(FromRow)]
struct BirthRecordRow {
    user_id: Uuid,
    full_name: String,
    birth_place: String,
    latitude: f64,
    longitude: f64,
    timezone_id: String,
    birth_date_time_local: NaiveDateTime,
    birth_date_time_iso: String,
    utc_offset_hours: f64,
    natal_chart: Option<Json<ChartSnapshot>>,
}

impl From<BirthRecordRow> for BirthRecord {
    fn from(row: BirthRecordRow) -> Self {
        BirthRecord {
            user_id: row.user_id,
            full_name: row.full_name,
            birth_place: row.birth_place,
            latitude: row.latitude,
            longitude: row.longitude,
            timezone_id: row.timezone_id,
            birth_date_time_local: row.birth_date_time_local,
            birth_date_time_iso: row.birth_date_time_iso,
            utc_offset_hours: row.utc_offset_hours,
            natal_chart: row.natal_chart.map(|Json(chart)| chart),
        }
    }
}

/// PostgreSQL-backed profile store
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn upsert_birth_record(&self, record: &BirthRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO birth_records (
                user_id, full_name, birth_place, latitude, longitude,
                timezone_id, birth_date_time_local, birth_date_time_iso,
                utc_offset_hours, natal_chart, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                full_name = EXCLUDED.full_name,
                birth_place = EXCLUDED.birth_place,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                timezone_id = EXCLUDED.timezone_id,
                birth_date_time_local = EXCLUDED.birth_date_time_local,
                birth_date_time_iso = EXCLUDED.birth_date_time_iso,
                utc_offset_hours = EXCLUDED.utc_offset_hours,
                natal_chart = EXCLUDED.natal_chart,
                updated_at = NOW()
            "#,
        )
        .bind(record.user_id)
        .bind(&record.full_name)
        .bind(&record.birth_place)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(&record.timezone_id)
        .bind(record.birth_date_time_local)
        .bind(&record.birth_date_time_iso)
        .bind(record.utc_offset_hours)
        .bind(record.natal_chart.as_ref().map(Json))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(format!("Failed to save birth record: {}", e)))?;

        Ok(())
    }

    async fn fetch_birth_record(&self, user_id: Uuid) -> AppResult<Option<BirthRecord>> {
        let row = sqlx::query_as::<_, BirthRecordRow>(
            r#"
            SELECT user_id, full_name, birth_place, latitude, longitude,
                   timezone_id, birth_date_time_local, birth_date_time_iso,
                   utc_offset_hours, natal_chart
            FROM birth_records
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BirthRecord::from))
    }
}

/// In-memory profile store for database-less deployments and tests.
#[derive(Default)]
pub struct MemoryProfileStore {
    records: Mutex<HashMap<Uuid, BirthRecord>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn upsert_birth_record(&self, record: &BirthRecord) -> AppResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::Persistence("Profile store lock poisoned".to_string()))?;
        records.insert(record.user_id, record.clone());
        Ok(())
    }

    async fn fetch_birth_record(&self, user_id: Uuid) -> AppResult<Option<BirthRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| AppError::Persistence("Profile store lock poisoned".to_string()))?;
        Ok(records.get(&user_id).cloned())
    }
}
