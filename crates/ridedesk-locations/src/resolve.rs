//! Lookups by id or display name.
//!
//! Matching is exact and case-sensitive. A miss is `Ok(None)` / `None`;
//! a name shared by several records is [`ResolveError::AmbiguousName`].

use ridedesk_core::{Center, City, State};

use crate::context::LocationContext;
use crate::error::ResolveError;
use crate::options::{city_options_for_state, AddressMode, Labelled, SelectOption};

/// How a caller addresses a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    ById(&'a str),
    ByName(&'a str),
}

#[must_use]
pub fn resolve_state_by_id<'c>(ctx: &'c LocationContext, id: &str) -> Option<&'c State> {
    ctx.states().iter().find(|s| s.id == id)
}

/// # Errors
///
/// Returns [`ResolveError::AmbiguousName`] if more than one state has `name`.
pub fn resolve_state_by_name<'c>(
    ctx: &'c LocationContext,
    name: &str,
) -> Result<Option<&'c State>, ResolveError> {
    unique_by_name(ctx.states(), name, "state")
}

/// # Errors
///
/// Returns [`ResolveError::AmbiguousName`] if more than one center has `name`.
pub fn resolve_center_by_name<'c>(
    ctx: &'c LocationContext,
    name: &str,
) -> Result<Option<&'c Center>, ResolveError> {
    unique_by_name(ctx.centers(), name, "center")
}

/// # Errors
///
/// Returns [`ResolveError::AmbiguousName`] for an ambiguous [`Selector::ByName`].
pub fn resolve_state<'c>(
    ctx: &'c LocationContext,
    selector: Selector<'_>,
) -> Result<Option<&'c State>, ResolveError> {
    match selector {
        Selector::ById(id) => Ok(resolve_state_by_id(ctx, id)),
        Selector::ByName(name) => resolve_state_by_name(ctx, name),
    }
}

/// Find a city among the cached cities of `state_id`. Cities of a state
/// that is not loaded never resolve.
///
/// # Errors
///
/// Returns [`ResolveError::AmbiguousName`] if the state has several cities
/// named the same.
pub fn resolve_city<'c>(
    ctx: &'c LocationContext,
    state_id: &str,
    selector: Selector<'_>,
) -> Result<Option<&'c City>, ResolveError> {
    if resolve_state_by_id(ctx, state_id).is_none() {
        return Ok(None);
    }
    let cities = ctx.cached_cities(state_id).unwrap_or_default();
    match selector {
        Selector::ById(id) => Ok(cities
            .iter()
            .find(|c| c.id == id && c.state_id == state_id)),
        Selector::ByName(name) => {
            let owned: Vec<&City> = cities.iter().filter(|c| c.state_id == state_id).collect();
            Ok(unique_by_name(&owned, name, "city")?.copied())
        }
    }
}

/// City options for a state addressed either way.
///
/// A name is first translated to the state's id, since the city cache is
/// keyed by id. An unknown state yields an empty list.
///
/// # Errors
///
/// Returns [`ResolveError::AmbiguousName`] if a state name is shared.
pub fn city_options(
    ctx: &LocationContext,
    state: Selector<'_>,
    mode: AddressMode,
) -> Result<Vec<SelectOption<City>>, ResolveError> {
    let Some(found) = resolve_state(ctx, state)? else {
        return Ok(Vec::new());
    };
    Ok(city_options_for_state(ctx, &found.id, mode))
}

fn unique_by_name<'c, T: Labelled>(
    items: &'c [T],
    name: &str,
    kind: &'static str,
) -> Result<Option<&'c T>, ResolveError> {
    let mut matches = items.iter().filter(|item| item.name() == name);
    let first = matches.next();
    let extra = matches.count();
    if extra > 0 {
        return Err(ResolveError::AmbiguousName {
            kind,
            name: name.to_owned(),
            matches: extra + 1,
        });
    }
    Ok(first)
}
