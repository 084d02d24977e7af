//! A state/city dropdown pair bound to one address mode.
//!
//! [`CascadeSelect`] is what a form embeds: it hands out option lists for
//! both dropdowns and turns the values they emit back into store selections.
//! Values are interpreted in the pair's [`AddressMode`] only.

use ridedesk_core::{Center, City, State};
use tokio::task::JoinHandle;

use crate::context::LocationContext;
use crate::error::ResolveError;
use crate::memo::OptionsMemo;
use crate::options::{city_options_for_state, AddressMode, Labelled, SelectOption};
use crate::resolve::{resolve_city, resolve_state};
use crate::source::LocationSource;
use crate::store::LocationStore;

/// Where a dropdown pair stands.
///
/// ```text
/// Uninitialized -> StateChosen -> CityListLoading -> CityListReady | CityListEmpty
/// ```
///
/// Choosing another state starts over at `StateChosen`. A failed city fetch
/// leaves the pair in `StateChosen`; the failure itself is in
/// [`LocationContext::last_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadePhase {
    Uninitialized,
    StateChosen(String),
    CityListLoading(String),
    CityListReady(String),
    CityListEmpty(String),
}

impl CascadePhase {
    #[must_use]
    pub fn of(ctx: &LocationContext) -> Self {
        let Some(state_id) = ctx.selection().state_id.clone() else {
            return CascadePhase::Uninitialized;
        };
        if ctx.is_loading(&state_id) {
            return CascadePhase::CityListLoading(state_id);
        }
        if ctx.cached_cities(&state_id).is_none() {
            return CascadePhase::StateChosen(state_id);
        }
        if city_options_for_state(ctx, &state_id, AddressMode::Id).is_empty() {
            CascadePhase::CityListEmpty(state_id)
        } else {
            CascadePhase::CityListReady(state_id)
        }
    }
}

/// What a dropdown reports upward after a choice, in the pair's mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub value: String,
    pub label: String,
}

impl SelectionEvent {
    fn from_record<T: Labelled>(record: &T, mode: AddressMode) -> Self {
        let value = match mode {
            AddressMode::Id => record.id(),
            AddressMode::Name => record.name(),
        };
        Self {
            value: value.to_owned(),
            label: record.name().to_owned(),
        }
    }
}

/// Result of choosing a state: the event to emit and the city fetch, if one
/// was dispatched.
#[derive(Debug)]
pub struct StateChoice {
    pub event: SelectionEvent,
    pub fetch: Option<JoinHandle<()>>,
}

impl StateChoice {
    /// Wait for the city fetch, if any, then return the event.
    pub async fn settled(self) -> SelectionEvent {
        if let Some(fetch) = self.fetch {
            if let Err(err) = fetch.await {
                tracing::warn!(error = %err, "city fetch task did not complete");
            }
        }
        self.event
    }
}

pub struct CascadeSelect<S> {
    store: LocationStore<S>,
    mode: AddressMode,
    memo: OptionsMemo,
}

impl<S: LocationSource + 'static> CascadeSelect<S> {
    #[must_use]
    pub fn new(store: LocationStore<S>, mode: AddressMode) -> Self {
        Self {
            store,
            mode,
            memo: OptionsMemo::new(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> AddressMode {
        self.mode
    }

    #[must_use]
    pub fn store(&self) -> &LocationStore<S> {
        &self.store
    }

    pub async fn state_options(&mut self) -> Vec<SelectOption<State>> {
        let ctx = self.store.snapshot().await;
        self.memo.state_options(&ctx, self.mode).to_vec()
    }

    /// Options for the city dropdown; empty until a state is chosen and its
    /// cities are cached.
    pub async fn city_options(&mut self) -> Vec<SelectOption<City>> {
        let ctx = self.store.snapshot().await;
        let Some(state_id) = ctx.selection().state_id.as_deref() else {
            return Vec::new();
        };
        self.memo.city_options(&ctx, state_id, self.mode).to_vec()
    }

    pub async fn center_options(&mut self) -> Vec<SelectOption<Center>> {
        let ctx = self.store.snapshot().await;
        self.memo.center_options(&ctx, self.mode).to_vec()
    }

    pub async fn phase(&self) -> CascadePhase {
        CascadePhase::of(&self.store.snapshot().await)
    }

    /// Handle a value emitted by the state dropdown.
    ///
    /// Returns `Ok(None)` when the value matches no loaded state; the store is
    /// left untouched in that case.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::AmbiguousName`] in name mode when several
    /// states share the value.
    pub async fn choose_state(
        &mut self,
        value: &str,
    ) -> Result<Option<StateChoice>, ResolveError> {
        let ctx = self.store.snapshot().await;
        let Some(state) = resolve_state(&ctx, self.mode.selector(value))?.cloned() else {
            tracing::debug!(value, mode = ?self.mode, "state choice matches no loaded state");
            return Ok(None);
        };
        let fetch = self.store.select_state(&state.id).await;
        Ok(Some(StateChoice {
            event: SelectionEvent::from_record(&state, self.mode),
            fetch,
        }))
    }

    /// Handle a value emitted by the city dropdown.
    ///
    /// Returns `Ok(None)` when no state is chosen or the value matches none
    /// of its cached cities.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::AmbiguousName`] in name mode when several
    /// cities of the state share the value.
    pub async fn choose_city(
        &mut self,
        value: &str,
    ) -> Result<Option<SelectionEvent>, ResolveError> {
        let ctx = self.store.snapshot().await;
        let Some(state_id) = ctx.selection().state_id.as_deref() else {
            return Ok(None);
        };
        let Some(city) = resolve_city(&ctx, state_id, self.mode.selector(value))?.cloned()
        else {
            return Ok(None);
        };
        if !self.store.select_city(&city.id).await {
            return Ok(None);
        }
        Ok(Some(SelectionEvent::from_record(&city, self.mode)))
    }
}

#[cfg(test)]
mod tests {
    use ridedesk_core::Selection;

    use super::*;

    fn ctx() -> LocationContext {
        LocationContext::new(
            vec![
                State {
                    id: "s1".to_string(),
                    name: "Texas".to_string(),
                },
                State {
                    id: "s2".to_string(),
                    name: "Ohio".to_string(),
                },
            ],
            Vec::new(),
        )
    }

    fn selected(state_id: &str) -> Selection {
        Selection {
            state_id: Some(state_id.to_string()),
            city_id: None,
        }
    }

    #[test]
    fn phase_uninitialized_without_selection() {
        assert_eq!(CascadePhase::of(&ctx()), CascadePhase::Uninitialized);
    }

    #[test]
    fn phase_state_chosen_before_fetch() {
        let ctx = ctx().with_selection(selected("s1"));
        assert_eq!(
            CascadePhase::of(&ctx),
            CascadePhase::StateChosen("s1".to_string())
        );
    }

    #[test]
    fn phase_loading_while_fetch_pending() {
        let mut ctx = ctx().with_selection(selected("s1"));
        ctx.begin_fetch("s1", 1);
        assert_eq!(
            CascadePhase::of(&ctx),
            CascadePhase::CityListLoading("s1".to_string())
        );
    }

    #[test]
    fn phase_ready_or_empty_after_fetch() {
        let ready = ctx()
            .with_selection(selected("s1"))
            .with_cities(
                "s1",
                vec![City {
                    id: "c1".to_string(),
                    name: "Austin".to_string(),
                    state_id: "s1".to_string(),
                }],
            );
        assert_eq!(
            CascadePhase::of(&ready),
            CascadePhase::CityListReady("s1".to_string())
        );

        let empty = ctx()
            .with_selection(selected("s2"))
            .with_cities("s2", Vec::new());
        assert_eq!(
            CascadePhase::of(&empty),
            CascadePhase::CityListEmpty("s2".to_string())
        );
    }

    #[test]
    fn event_value_follows_mode() {
        let state = State {
            id: "s1".to_string(),
            name: "Texas".to_string(),
        };
        assert_eq!(
            SelectionEvent::from_record(&state, AddressMode::Id),
            SelectionEvent {
                value: "s1".to_string(),
                label: "Texas".to_string()
            }
        );
        assert_eq!(
            SelectionEvent::from_record(&state, AddressMode::Name).value,
            "Texas"
        );
    }
}
