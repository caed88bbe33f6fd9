//! Process-local cache of the full contact roster.
//!
//! The roster is valid while `loaded && now - last_fetch < ttl`. A failed
//! fetch caches an empty roster as fresh and remembers the failure, so
//! callers can tell an honest zero from a degraded one. Concurrent misses
//! are serialized through a fetch gate and re-check freshness once inside,
//! so they cost one backend round trip.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mailreach_contacts::{fetch_roster, ContactSource};
use mailreach_core::config::AppConfig;
use mailreach_core::types::{CacheStatus, Contact};
use mailreach_core::Clock;
use parking_lot::RwLock;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy)]
pub struct RosterCacheSettings {
    pub ttl: Duration,
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for RosterCacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(5),
            page_size: 10_000,
            max_pages: 100,
        }
    }
}

impl From<&AppConfig> for RosterCacheSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            ttl: Duration::seconds(config.segmentation.cache_ttl_secs as i64),
            page_size: config.contacts_api.page_size,
            max_pages: config.contacts_api.max_pages,
        }
    }
}

/// The roster as seen by one evaluation pass.
#[derive(Debug, Clone)]
pub struct RosterSnapshot {
    pub contacts: Arc<Vec<Contact>>,
    pub fetched_at: DateTime<Utc>,
    /// Set when this roster is the empty stand-in for a failed fetch.
    pub fetch_error: Option<String>,
}

struct CacheState {
    contacts: Arc<Vec<Contact>>,
    loaded: bool,
    last_fetch: Option<DateTime<Utc>>,
    fetch_error: Option<String>,
    generation: u64,
}

impl CacheState {
    fn empty(generation: u64) -> Self {
        Self {
            contacts: Arc::new(Vec::new()),
            loaded: false,
            last_fetch: None,
            fetch_error: None,
            generation,
        }
    }
}

pub struct RosterCache {
    source: Arc<dyn ContactSource>,
    clock: Arc<dyn Clock>,
    settings: RosterCacheSettings,
    state: RwLock<CacheState>,
    fetch_gate: tokio::sync::Mutex<()>,
}

impl RosterCache {
    pub fn new(
        source: Arc<dyn ContactSource>,
        clock: Arc<dyn Clock>,
        settings: RosterCacheSettings,
    ) -> Self {
        Self {
            source,
            clock,
            settings,
            state: RwLock::new(CacheState::empty(0)),
            fetch_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn fresh_snapshot(&self, now: DateTime<Utc>) -> Option<RosterSnapshot> {
        let state = self.state.read();
        let last_fetch = state.last_fetch?;
        if state.loaded && now - last_fetch < self.settings.ttl {
            Some(RosterSnapshot {
                contacts: state.contacts.clone(),
                fetched_at: last_fetch,
                fetch_error: state.fetch_error.clone(),
            })
        } else {
            None
        }
    }

    /// Return the cached roster, fetching it first if stale or unloaded.
    /// Never fails: a fetch error yields an empty roster.
    pub async fn fetch_contacts(&self) -> RosterSnapshot {
        if let Some(snapshot) = self.fresh_snapshot(self.clock.now()) {
            metrics::counter!("segmentation.cache.hit").increment(1);
            return snapshot;
        }

        let _gate = self.fetch_gate.lock().await;

        // Another caller may have refilled the cache while we waited.
        if let Some(snapshot) = self.fresh_snapshot(self.clock.now()) {
            metrics::counter!("segmentation.cache.hit").increment(1);
            return snapshot;
        }
        metrics::counter!("segmentation.cache.miss").increment(1);

        let generation = self.state.read().generation;
        let (contacts, fetch_error) = match fetch_roster(
            self.source.as_ref(),
            self.settings.page_size,
            self.settings.max_pages,
        )
        .await
        {
            Ok(contacts) => (contacts, None),
            Err(e) => {
                error!(error = %e, "Contact roster fetch failed, serving empty roster");
                metrics::counter!("segmentation.cache.fetch_failed").increment(1);
                (Vec::new(), Some(e.to_string()))
            }
        };
        metrics::histogram!("segmentation.roster.size").record(contacts.len() as f64);

        let snapshot = RosterSnapshot {
            contacts: Arc::new(contacts),
            fetched_at: self.clock.now(),
            fetch_error,
        };

        let mut state = self.state.write();
        if state.generation == generation {
            state.contacts = snapshot.contacts.clone();
            state.loaded = true;
            state.last_fetch = Some(snapshot.fetched_at);
            state.fetch_error = snapshot.fetch_error.clone();
        } else {
            debug!("Cache refreshed during fetch, result not stored");
        }

        snapshot
    }

    /// Drop the cached roster so the next read goes to the backend.
    pub fn refresh_cache(&self) {
        let mut state = self.state.write();
        let generation = state.generation + 1;
        *state = CacheState::empty(generation);
        info!("Contact roster cache cleared");
    }

    pub fn get_cache_status(&self) -> CacheStatus {
        let state = self.state.read();
        CacheStatus {
            loaded: state.loaded,
            last_fetch: state.last_fetch.map_or(0, |t| t.timestamp_millis()),
            count: state.contacts.len(),
        }
    }
}
