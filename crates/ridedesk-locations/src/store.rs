//! Live location state shared by the dashboard's pickers.
//!
//! The store owns one [`LocationContext`] behind a lock. Mutations bump the
//! context revision and publish it on a `watch` channel so views know to
//! re-derive their options. City fetches run as spawned tasks; callers never
//! wait on them unless they choose to await the returned handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use crate::context::LocationContext;
use crate::error::SourceError;
use crate::resolve::{resolve_city, Selector};
use crate::source::LocationSource;

struct Shared<S> {
    source: S,
    context: RwLock<LocationContext>,
    revisions: watch::Sender<u64>,
    generation: AtomicU64,
}

pub struct LocationStore<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for LocationStore<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: LocationSource + 'static> LocationStore<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_context(source, LocationContext::default())
    }

    /// Start from a prepared context, e.g. one restored from a previous view.
    #[must_use]
    pub fn with_context(source: S, context: LocationContext) -> Self {
        let (revisions, _) = watch::channel(context.revision());
        Self {
            shared: Arc::new(Shared {
                source,
                context: RwLock::new(context),
                revisions,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Fetch states and centers. Called once per session.
    ///
    /// # Errors
    ///
    /// Returns the source error after recording it in the context's
    /// `last_error`; previously loaded lists are kept.
    pub async fn load(&self) -> Result<(), SourceError> {
        let source = &self.shared.source;
        let (states, centers) =
            match tokio::try_join!(source.fetch_states(), source.fetch_centers()) {
                Ok(pair) => pair,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to load states and centers");
                    let message = err.to_string();
                    self.mutate(|ctx| ctx.record_load_error(message)).await;
                    return Err(err);
                }
            };

        tracing::info!(
            states = states.len(),
            centers = centers.len(),
            "loaded location lists"
        );
        self.mutate(|ctx| {
            ctx.replace_roots(states, centers);
            ctx.clear_load_error();
        })
        .await;
        Ok(())
    }

    /// Make `state_id` the active state and fetch its cities if needed.
    ///
    /// Changing the state clears the selected city under the same lock. The
    /// cache check runs on every call, even when the state is already
    /// selected. Returns the fetch task when one was dispatched.
    pub async fn select_state(&self, state_id: &str) -> Option<JoinHandle<()>> {
        let changed = self
            .mutate(|ctx| ctx.selection_mut().choose_state(state_id))
            .await;
        if changed {
            tracing::debug!(state_id, "state selected");
        }
        self.ensure_cities(state_id).await
    }

    /// Select a city of the active state. Returns `false` (and changes
    /// nothing) when no state is active or the city is not among its cached
    /// cities.
    pub async fn select_city(&self, city_id: &str) -> bool {
        let mut ctx = self.shared.context.write().await;
        let Some(state_id) = ctx.selection().state_id.clone() else {
            return false;
        };
        let known = matches!(
            resolve_city(&ctx, &state_id, Selector::ById(city_id)),
            Ok(Some(_))
        );
        if !known {
            tracing::debug!(
                state_id = %state_id,
                city_id,
                "ignoring city outside the active state"
            );
            return false;
        }
        ctx.selection_mut().city_id = Some(city_id.to_owned());
        let revision = ctx.bump();
        drop(ctx);
        self.shared.revisions.send_replace(revision);
        true
    }

    /// Dispatch a city fetch for `state_id` unless its cities are cached.
    pub async fn ensure_cities(&self, state_id: &str) -> Option<JoinHandle<()>> {
        let generation = {
            let mut ctx = self.shared.context.write().await;
            if ctx.cached_cities(state_id).is_some() {
                return None;
            }
            let generation = self.shared.generation.fetch_add(1, Ordering::Relaxed) + 1;
            ctx.begin_fetch(state_id, generation);
            let revision = ctx.bump();
            self.shared.revisions.send_replace(revision);
            generation
        };

        tracing::debug!(state_id, generation, "dispatching city fetch");
        let shared = Arc::clone(&self.shared);
        let state_id = state_id.to_owned();
        Some(tokio::spawn(fetch_cities(shared, state_id, generation)))
    }

    /// Drop the cached cities of one state so the next selection refetches.
    /// A fetch still in flight for that state is abandoned; its result is
    /// discarded when it lands.
    pub async fn invalidate_cities(&self, state_id: &str) -> bool {
        self.mutate(|ctx| ctx.evict_cities(state_id)).await
    }

    /// A copy of the current context for option derivation.
    pub async fn snapshot(&self) -> LocationContext {
        self.shared.context.read().await.clone()
    }

    /// Receives the context revision after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revisions.subscribe()
    }

    async fn mutate<R>(&self, f: impl FnOnce(&mut LocationContext) -> R) -> R {
        let mut ctx = self.shared.context.write().await;
        let out = f(&mut ctx);
        let revision = ctx.bump();
        drop(ctx);
        self.shared.revisions.send_replace(revision);
        out
    }
}

async fn fetch_cities<S: LocationSource>(shared: Arc<Shared<S>>, state_id: String, generation: u64) {
    let result = shared.source.fetch_cities(&state_id).await;

    let mut ctx = shared.context.write().await;
    match result {
        Ok(cities) => {
            tracing::debug!(
                state_id = %state_id,
                generation,
                count = cities.len(),
                "city fetch completed"
            );
            ctx.store_cities(&state_id, cities, generation);
            ctx.finish_fetch(&state_id, generation, None);
        }
        Err(err) => {
            tracing::warn!(
                state_id = %state_id,
                generation,
                error = %err,
                "city fetch failed"
            );
            ctx.finish_fetch(&state_id, generation, Some(err.to_string()));
        }
    }
    let revision = ctx.bump();
    drop(ctx);
    shared.revisions.send_replace(revision);
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
