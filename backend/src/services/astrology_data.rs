//! Astrology data manager
//!
//! Single authoritative holder for the session's natal and transit chart
//! snapshots. All readers share it; the only writers are its own methods.
//!
//! Transit generation is guarded against two races: a slow older generation
//! finishing after a newer one (stale results are discarded by sequence
//! number) and a generation started before sign-out landing after `clear()`
//! (discarded by epoch).

use std::sync::{Arc, RwLock};

use chrono::Utc;
use shared::models::ChartSnapshot;

use crate::astro::ChartEngine;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    epoch: u64,
    seq: u64,
}

#[derive(Default)]
struct RuntimeState {
    natal_chart: Option<ChartSnapshot>,
    transit_chart: Option<ChartSnapshot>,
    epoch: u64,
    next_seq: u64,
    last_applied_seq: u64,
}

/// Session-scoped chart snapshot holder.
pub struct AstrologyDataManager {
    engine: Arc<dyn ChartEngine>,
    state: RwLock<RuntimeState>,
}

impl AstrologyDataManager {
    pub fn new(engine: Arc<dyn ChartEngine>) -> Self {
        Self {
            engine,
            state: RwLock::new(RuntimeState::default()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RuntimeState> {
        // Poisoning only happens if a writer panicked; recover the data.
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RuntimeState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Unconditional overwrite. Snapshot shape is trusted, not validated.
    pub fn set_natal_chart(&self, snapshot: ChartSnapshot) {
        self.write().natal_chart = Some(snapshot);
    }

    /// Unconditional overwrite, bypassing the generation guard.
    pub fn set_transit_chart(&self, snapshot: ChartSnapshot) {
        self.write().transit_chart = Some(snapshot);
    }

    pub fn natal_chart(&self) -> Option<ChartSnapshot> {
        self.read().natal_chart.clone()
    }

    pub fn transit_chart(&self) -> Option<ChartSnapshot> {
        self.read().transit_chart.clone()
    }

    /// Compute a transit chart for the current instant at the given
    /// location, store it, and return it.
    ///
    /// Engine failures are propagated to the caller after logging. The
    /// stored state only ever advances: a result from an older call (or an
    /// earlier session) is returned to its caller but never overwrites a
    /// newer one.
    pub fn generate_transit_chart(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<ChartSnapshot> {
        let ticket = self.begin_generation();

        let snapshot = self
            .engine
            .compute_chart(Utc::now(), latitude, longitude)
            .map_err(|e| {
                tracing::error!("Transit chart computation failed: {}", e);
                e
            })?;

        self.commit_transit(ticket, snapshot.clone());
        Ok(snapshot)
    }

    /// Reset both snapshots. Must be called on sign-out so one user's
    /// charts never leak into the next session; also invalidates every
    /// in-flight generation ticket.
    pub fn clear(&self) {
        let mut state = self.write();
        state.natal_chart = None;
        state.transit_chart = None;
        state.epoch += 1;
        state.next_seq = 0;
        state.last_applied_seq = 0;
    }

    fn begin_generation(&self) -> Ticket {
        let mut state = self.write();
        state.next_seq += 1;
        Ticket {
            epoch: state.epoch,
            seq: state.next_seq,
        }
    }

    /// Apply a generated snapshot if its ticket is still current.
    /// Returns whether the snapshot was stored.
    fn commit_transit(&self, ticket: Ticket, snapshot: ChartSnapshot) -> bool {
        let mut state = self.write();
        if ticket.epoch != state.epoch || ticket.seq <= state.last_applied_seq {
            tracing::debug!(
                epoch = ticket.epoch,
                seq = ticket.seq,
                "Discarding stale transit chart result"
            );
            return false;
        }
        state.last_applied_seq = ticket.seq;
        state.transit_chart = Some(snapshot);
        true
    }
}

impl std::fmt::Debug for AstrologyDataManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("AstrologyDataManager")
            .field("natal_set", &state.natal_chart.is_some())
            .field("transit_set", &state.transit_chart.is_some())
            .field("epoch", &state.epoch)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::MeanElementsEngine;
    use shared::models::BodyPosition;

    fn manager() -> AstrologyDataManager {
        AstrologyDataManager::new(Arc::new(MeanElementsEngine::new()))
    }

    fn snapshot_with(label: &str, longitude: f64) -> ChartSnapshot {
        let mut snapshot = ChartSnapshot::new();
        snapshot.insert(label, BodyPosition::from_longitude(longitude, None, false));
        snapshot
    }

    #[test]
    fn test_unset_charts_are_none() {
        let manager = manager();
        assert!(manager.natal_chart().is_none());
        assert!(manager.transit_chart().is_none());
    }

    #[test]
    fn test_set_and_get() {
        let manager = manager();
        manager.set_natal_chart(snapshot_with("Sun", 10.0));
        assert!(manager.natal_chart().unwrap().contains("sun"));
    }

    #[test]
    fn test_clear_resets_both() {
        let manager = manager();
        manager.set_natal_chart(snapshot_with("Sun", 10.0));
        manager.set_transit_chart(snapshot_with("Moon", 20.0));

        manager.clear();
        assert!(manager.natal_chart().is_none());
        assert!(manager.transit_chart().is_none());
    }

    #[test]
    fn test_generate_stores_and_returns() {
        let manager = manager();
        let generated = manager.generate_transit_chart(48.85, 2.35).unwrap();
        assert_eq!(manager.transit_chart().unwrap(), generated);
    }

    #[test]
    fn test_stale_result_does_not_clobber_newer() {
        let manager = manager();

        let older = manager.begin_generation();
        let newer = manager.begin_generation();

        assert!(manager.commit_transit(newer, snapshot_with("Sun", 1.0)));
        // The older call finishes late; its result must be discarded.
        assert!(!manager.commit_transit(older, snapshot_with("Sun", 2.0)));

        let kept = manager.transit_chart().unwrap();
        assert!((kept.get("sun").unwrap().degree_in_sign - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_invalidates_in_flight_tickets() {
        let manager = manager();
        let ticket = manager.begin_generation();

        manager.clear();

        assert!(!manager.commit_transit(ticket, snapshot_with("Sun", 5.0)));
        assert!(manager.transit_chart().is_none());
    }

    #[test]
    fn test_generate_propagates_engine_errors() {
        let manager = manager();
        assert!(matches!(
            manager.generate_transit_chart(120.0, 0.0),
            Err(AppError::Computation(_))
        ));
        assert!(manager.transit_chart().is_none());
    }
}
