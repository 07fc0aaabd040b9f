use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use axum::extract::FromRef;

use crate::config::Config;
use crate::error::PartialDataWarning;
use crate::models::series::CanonicalSeries;

/// Cache key for one fetched series. Coordinates quantized to 1e-5°
/// (≈1 m) and angles to 0.1° so floats hash deterministically and
/// equal requests hit the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    lat_e5: i64,
    lon_e5: i64,
    year: i32,
    tilt_e1: i64,
    azimuth_e1: i64,
}

impl SeriesKey {
    pub fn new(lat: f64, lon: f64, year: i32, tilt_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            lat_e5: (lat * 1e5).round() as i64,
            lon_e5: (lon * 1e5).round() as i64,
            year,
            tilt_e1: (tilt_deg * 10.0).round() as i64,
            azimuth_e1: (azimuth_deg * 10.0).round() as i64,
        }
    }
}

struct CacheEntry {
    fetched_at: Instant,
    series: Arc<CanonicalSeries>,
    warnings: Vec<PartialDataWarning>,
}

/// Single time-bounded cache layer around the PVGIS fetch. The cached
/// series is immutable and shared via `Arc`; downstream computations
/// only ever read it.
#[derive(Clone)]
pub struct AppState {
    cache: Arc<RwLock<HashMap<SeriesKey, CacheEntry>>>,
    ttl: Duration,
}

impl AppState {
    pub fn new(ttl_s: u64) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_secs(ttl_s),
        }
    }

    pub fn get(&self, key: &SeriesKey) -> Option<(Arc<CanonicalSeries>, Vec<PartialDataWarning>)> {
        let map = self.cache.read().ok()?;
        let entry = map.get(key)?;
        if entry.fetched_at.elapsed() > self.ttl {
            return None;
        }
        Some((Arc::clone(&entry.series), entry.warnings.clone()))
    }

    pub fn insert(
        &self,
        key: SeriesKey,
        series: Arc<CanonicalSeries>,
        warnings: Vec<PartialDataWarning>,
    ) {
        if let Ok(mut map) = self.cache.write() {
            // Expired entries are dead weight; sweep them while the
            // write lock is held so the map stays bounded by the set of
            // keys requested within one TTL window.
            let ttl = self.ttl;
            map.retain(|_, e| e.fetched_at.elapsed() <= ttl);
            map.insert(
                key,
                CacheEntry {
                    fetched_at: Instant::now(),
                    series,
                    warnings,
                },
            );
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.cache.read().map(|m| m.len()).unwrap_or(0)
    }
}

/// Combined router state. Handlers extract `State<AppState>` and/or
/// `State<Config>` via `FromRef` — a single `.with_state(shared)`
/// covers both.
#[derive(Clone)]
pub struct SharedState {
    pub app: AppState,
    pub config: Config,
}

impl FromRef<SharedState> for AppState {
    fn from_ref(shared: &SharedState) -> Self {
        shared.app.clone()
    }
}

impl FromRef<SharedState> for Config {
    fn from_ref(shared: &SharedState) -> Self {
        shared.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::series::CanonicalSeries;

    #[test]
    fn equal_requests_map_to_the_same_key() {
        let a = SeriesKey::new(40.4168, -3.7038, 2022, 25.0, 0.0);
        let b = SeriesKey::new(40.41680, -3.70380, 2022, 25.0, -0.0);
        assert_eq!(a, b);
        let c = SeriesKey::new(40.4168, -3.7038, 2023, 25.0, 0.0);
        assert_ne!(a, c, "year is part of the key");
    }

    #[test]
    fn cache_round_trips_series_and_warnings() {
        let state = AppState::new(3600);
        let key = SeriesKey::new(40.0, -3.0, 2022, 25.0, 0.0);
        assert!(state.get(&key).is_none());

        let series = Arc::new(CanonicalSeries { samples: vec![] });
        state.insert(key, Arc::clone(&series), vec![PartialDataWarning::TemperatureDefaulted]);
        let (cached, warnings) = state.get(&key).expect("entry must be present");
        assert!(Arc::ptr_eq(&cached, &series));
        assert_eq!(warnings, vec![PartialDataWarning::TemperatureDefaulted]);
    }

    #[test]
    fn insert_sweeps_expired_entries() {
        let state = AppState::new(0);
        let a = SeriesKey::new(40.0, -3.0, 2022, 25.0, 0.0);
        let b = SeriesKey::new(41.0, 2.0, 2022, 25.0, 0.0);
        state.insert(a, Arc::new(CanonicalSeries { samples: vec![] }), vec![]);
        std::thread::sleep(Duration::from_millis(2));
        state.insert(b, Arc::new(CanonicalSeries { samples: vec![] }), vec![]);
        assert_eq!(state.len(), 1, "expired entry must be pruned, not retained");
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let state = AppState::new(0);
        let key = SeriesKey::new(40.0, -3.0, 2022, 25.0, 0.0);
        state.insert(key, Arc::new(CanonicalSeries { samples: vec![] }), vec![]);
        std::thread::sleep(Duration::from_millis(2));
        assert!(state.get(&key).is_none(), "expired entry must not be served");
    }
}
