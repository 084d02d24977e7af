//! State/city/center cascade for the dashboard's location pickers.
//!
//! Option derivation and lookups are pure functions over a
//! [`LocationContext`] snapshot. [`LocationStore`] owns the live context and
//! fetches cities per state through a [`LocationSource`].

pub mod cascade;
pub mod client;
pub mod context;
pub mod error;
pub mod fixture;
pub mod memo;
pub mod options;
pub mod resolve;
pub(crate) mod retry;
pub mod source;
pub mod store;

pub use cascade::{CascadePhase, CascadeSelect, SelectionEvent, StateChoice};
pub use client::LocationClient;
pub use context::{FetchFailure, LocationContext};
pub use error::{ResolveError, SourceError};
pub use fixture::FixtureSource;
pub use memo::OptionsMemo;
pub use options::{
    center_options, city_options_for_state, state_options, AddressMode, Labelled, SelectOption,
};
pub use resolve::{
    city_options, resolve_center_by_name, resolve_city, resolve_state, resolve_state_by_id,
    resolve_state_by_name, Selector,
};
pub use source::LocationSource;
pub use store::LocationStore;
