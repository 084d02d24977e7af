//! Dropdown option derivation.
//!
//! Options are rebuilt from the context on demand and never stored. In
//! [`AddressMode::Name`] the option `value` carries the display name instead
//! of the id; labels are always names.

use ridedesk_core::{Center, City, State};
use serde::{Deserialize, Serialize};

use crate::context::LocationContext;
use crate::resolve::{resolve_state_by_id, Selector};

/// How a dropdown pair communicates selections across component boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressMode {
    #[default]
    Id,
    Name,
}

impl AddressMode {
    /// Interpret a value emitted by a dropdown running in this mode.
    #[must_use]
    pub fn selector(self, value: &str) -> Selector<'_> {
        match self {
            AddressMode::Id => Selector::ById(value),
            AddressMode::Name => Selector::ByName(value),
        }
    }
}

/// Records that can be shown in a dropdown.
pub trait Labelled {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl Labelled for State {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Labelled for City {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Labelled for Center {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Labelled + ?Sized> Labelled for &T {
    fn id(&self) -> &str {
        (**self).id()
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// One dropdown entry. Serializes as `{ value, label, ...source }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption<T> {
    pub value: String,
    pub label: String,
    #[serde(flatten)]
    pub source: T,
}

impl<T: Labelled + Clone> SelectOption<T> {
    #[must_use]
    pub fn from_record(record: &T, mode: AddressMode) -> Self {
        let value = match mode {
            AddressMode::Id => record.id(),
            AddressMode::Name => record.name(),
        };
        Self {
            value: value.to_owned(),
            label: record.name().to_owned(),
            source: record.clone(),
        }
    }
}

/// One option per loaded state, in source order.
#[must_use]
pub fn state_options(ctx: &LocationContext, mode: AddressMode) -> Vec<SelectOption<State>> {
    ctx.states()
        .iter()
        .map(|s| SelectOption::from_record(s, mode))
        .collect()
}

/// Options for the cached cities of `state_id`.
///
/// Empty when the state is not loaded or its cities have not been fetched.
/// Cities whose `state_id` does not match are dropped.
#[must_use]
pub fn city_options_for_state(
    ctx: &LocationContext,
    state_id: &str,
    mode: AddressMode,
) -> Vec<SelectOption<City>> {
    if resolve_state_by_id(ctx, state_id).is_none() {
        return Vec::new();
    }
    ctx.cached_cities(state_id)
        .unwrap_or_default()
        .iter()
        .filter(|c| c.state_id == state_id)
        .map(|c| SelectOption::from_record(c, mode))
        .collect()
}

#[must_use]
pub fn center_options(ctx: &LocationContext, mode: AddressMode) -> Vec<SelectOption<Center>> {
    ctx.centers()
        .iter()
        .map(|c| SelectOption::from_record(c, mode))
        .collect()
}
