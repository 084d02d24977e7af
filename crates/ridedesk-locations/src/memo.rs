//! Memoized option lists.
//!
//! A view re-derives options on every render; this keeps the last list per
//! kind and rebuilds it only when the context revision, the address mode, or
//! (for cities) the state changes.

use ridedesk_core::{Center, City, State};

use crate::context::LocationContext;
use crate::options::{
    center_options, city_options_for_state, state_options, AddressMode, SelectOption,
};

#[derive(Debug)]
struct Memo<T> {
    revision: u64,
    mode: AddressMode,
    key: String,
    options: Vec<SelectOption<T>>,
}

#[derive(Debug, Default)]
pub struct OptionsMemo {
    states: Option<Memo<State>>,
    cities: Option<Memo<City>>,
    centers: Option<Memo<Center>>,
    recomputations: u64,
}

impl OptionsMemo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_options(
        &mut self,
        ctx: &LocationContext,
        mode: AddressMode,
    ) -> &[SelectOption<State>] {
        refresh(&mut self.states, &mut self.recomputations, ctx, mode, "", || {
            state_options(ctx, mode)
        })
    }

    pub fn city_options(
        &mut self,
        ctx: &LocationContext,
        state_id: &str,
        mode: AddressMode,
    ) -> &[SelectOption<City>] {
        refresh(
            &mut self.cities,
            &mut self.recomputations,
            ctx,
            mode,
            state_id,
            || city_options_for_state(ctx, state_id, mode),
        )
    }

    pub fn center_options(
        &mut self,
        ctx: &LocationContext,
        mode: AddressMode,
    ) -> &[SelectOption<Center>] {
        refresh(&mut self.centers, &mut self.recomputations, ctx, mode, "", || {
            center_options(ctx, mode)
        })
    }

    /// How many lists have been derived from scratch.
    #[must_use]
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

fn refresh<'m, T>(
    slot: &'m mut Option<Memo<T>>,
    recomputations: &mut u64,
    ctx: &LocationContext,
    mode: AddressMode,
    key: &str,
    derive: impl FnOnce() -> Vec<SelectOption<T>>,
) -> &'m [SelectOption<T>] {
    let revision = ctx.revision();
    let stale = slot
        .as_ref()
        .is_none_or(|m| m.revision != revision || m.mode != mode || m.key != key);
    if stale {
        *recomputations += 1;
        *slot = Some(Memo {
            revision,
            mode,
            key: key.to_owned(),
            options: derive(),
        });
    }
    slot.as_ref().map_or(&[], |m| m.options.as_slice())
}
