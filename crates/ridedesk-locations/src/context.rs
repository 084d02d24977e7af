//! Snapshot of everything the cascade reads.
//!
//! A `LocationContext` is plain data: the store mutates one behind a lock and
//! hands out clones, and tests build one directly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ridedesk_core::{Center, City, Selection, State};

#[derive(Debug, Clone)]
struct CityCacheEntry {
    cities: Vec<City>,
    generation: u64,
    fetched_at: DateTime<Utc>,
}

/// The most recent fetch that failed. `state_id` is `None` when loading the
/// state and center lists failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub state_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct LocationContext {
    states: Vec<State>,
    centers: Vec<Center>,
    cities: HashMap<String, CityCacheEntry>,
    selection: Selection,
    /// Newest outstanding fetch generation per state id.
    pending: HashMap<String, u64>,
    /// Fetches at or below this generation were invalidated in flight.
    superseded: HashMap<String, u64>,
    last_error: Option<FetchFailure>,
    revision: u64,
}

impl LocationContext {
    #[must_use]
    pub fn new(states: Vec<State>, centers: Vec<Center>) -> Self {
        Self {
            states,
            centers,
            ..Self::default()
        }
    }

    /// Seed the city cache for one state.
    #[must_use]
    pub fn with_cities(mut self, state_id: &str, cities: Vec<City>) -> Self {
        self.store_cities(state_id, cities, 0);
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    #[must_use]
    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Cached cities for `state_id`, or `None` if never fetched.
    #[must_use]
    pub fn cached_cities(&self, state_id: &str) -> Option<&[City]> {
        self.cities.get(state_id).map(|e| e.cities.as_slice())
    }

    #[must_use]
    pub fn cities_fetched_at(&self, state_id: &str) -> Option<DateTime<Utc>> {
        self.cities.get(state_id).map(|e| e.fetched_at)
    }

    #[must_use]
    pub fn is_loading(&self, state_id: &str) -> bool {
        self.pending.contains_key(state_id)
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&FetchFailure> {
        self.last_error.as_ref()
    }

    /// Bumped on every mutation; memoized options key on it.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub(crate) fn replace_roots(&mut self, states: Vec<State>, centers: Vec<Center>) {
        self.states = states;
        self.centers = centers;
    }

    pub(crate) fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub(crate) fn begin_fetch(&mut self, state_id: &str, generation: u64) {
        self.pending.insert(state_id.to_owned(), generation);
    }

    /// Write a fetched city list unless a newer fetch already landed or the
    /// fetch was invalidated while in flight.
    pub(crate) fn store_cities(&mut self, state_id: &str, cities: Vec<City>, generation: u64) {
        if self
            .superseded
            .get(state_id)
            .is_some_and(|floor| *floor >= generation)
        {
            return;
        }
        if self
            .cities
            .get(state_id)
            .is_some_and(|existing| existing.generation > generation)
        {
            return;
        }
        self.cities.insert(
            state_id.to_owned(),
            CityCacheEntry {
                cities,
                generation,
                fetched_at: Utc::now(),
            },
        );
    }

    /// Settle a fetch. Only the newest generation for a state may clear its
    /// loading flag or touch `last_error`.
    pub(crate) fn finish_fetch(&mut self, state_id: &str, generation: u64, error: Option<String>) {
        if self.pending.get(state_id) != Some(&generation) {
            return;
        }
        self.pending.remove(state_id);
        match error {
            Some(message) => {
                self.last_error = Some(FetchFailure {
                    state_id: Some(state_id.to_owned()),
                    message,
                });
            }
            None => {
                if self
                    .last_error
                    .as_ref()
                    .is_some_and(|f| f.state_id.as_deref() == Some(state_id))
                {
                    self.last_error = None;
                }
            }
        }
    }

    pub(crate) fn record_load_error(&mut self, message: String) {
        self.last_error = Some(FetchFailure {
            state_id: None,
            message,
        });
    }

    pub(crate) fn clear_load_error(&mut self) {
        if self.last_error.as_ref().is_some_and(|f| f.state_id.is_none()) {
            self.last_error = None;
        }
    }

    /// Drop the cached cities of one state and abandon its outstanding fetch.
    /// Returns `true` if either existed.
    pub(crate) fn evict_cities(&mut self, state_id: &str) -> bool {
        let evicted = self.cities.remove(state_id).is_some();
        let Some(generation) = self.pending.remove(state_id) else {
            return evicted;
        };
        let floor = self.superseded.entry(state_id.to_owned()).or_insert(0);
        *floor = (*floor).max(generation);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(id: &str, state_id: &str) -> City {
        City {
            id: id.to_string(),
            name: id.to_uppercase(),
            state_id: state_id.to_string(),
        }
    }

    #[test]
    fn older_generation_does_not_overwrite_newer_cache() {
        let mut ctx = LocationContext::default();
        ctx.store_cities("s1", vec![city("new", "s1")], 2);
        ctx.store_cities("s1", vec![city("old", "s1")], 1);
        assert_eq!(ctx.cached_cities("s1").unwrap()[0].id, "new");
    }

    #[test]
    fn stale_finish_keeps_loading_flag() {
        let mut ctx = LocationContext::default();
        ctx.begin_fetch("s1", 1);
        ctx.begin_fetch("s1", 2);
        ctx.finish_fetch("s1", 1, Some("boom".to_string()));
        assert!(ctx.is_loading("s1"));
        assert!(ctx.last_error().is_none());
        ctx.finish_fetch("s1", 2, None);
        assert!(!ctx.is_loading("s1"));
    }

    #[test]
    fn newest_failure_is_recorded_and_cleared_by_success() {
        let mut ctx = LocationContext::default();
        ctx.begin_fetch("s1", 1);
        ctx.finish_fetch("s1", 1, Some("timeout".to_string()));
        assert_eq!(ctx.last_error().unwrap().state_id.as_deref(), Some("s1"));

        ctx.begin_fetch("s1", 2);
        ctx.finish_fetch("s1", 2, None);
        assert!(ctx.last_error().is_none());
    }

    #[test]
    fn success_for_other_state_keeps_error() {
        let mut ctx = LocationContext::default();
        ctx.begin_fetch("s1", 1);
        ctx.finish_fetch("s1", 1, Some("timeout".to_string()));
        ctx.begin_fetch("s2", 2);
        ctx.finish_fetch("s2", 2, None);
        assert_eq!(ctx.last_error().unwrap().state_id.as_deref(), Some("s1"));
    }

    #[test]
    fn evict_reports_whether_entry_existed() {
        let mut ctx = LocationContext::default().with_cities("s1", vec![city("c1", "s1")]);
        assert!(ctx.evict_cities("s1"));
        assert!(!ctx.evict_cities("s1"));
        assert!(ctx.cached_cities("s1").is_none());
    }

    #[test]
    fn evict_abandons_in_flight_fetch() {
        let mut ctx = LocationContext::default();
        ctx.begin_fetch("s1", 1);
        assert!(ctx.evict_cities("s1"));
        assert!(!ctx.is_loading("s1"));

        ctx.store_cities("s1", vec![city("stale", "s1")], 1);
        ctx.finish_fetch("s1", 1, Some("late".to_string()));
        assert!(ctx.cached_cities("s1").is_none());
        assert!(ctx.last_error().is_none());

        ctx.begin_fetch("s1", 2);
        ctx.store_cities("s1", vec![city("fresh", "s1")], 2);
        ctx.finish_fetch("s1", 2, None);
        assert_eq!(ctx.cached_cities("s1").unwrap()[0].id, "fresh");
        assert!(!ctx.is_loading("s1"));
    }
}
