use std::sync::Arc;

use async_trait::async_trait;
use ridedesk_core::{Center, City, State};

use crate::error::SourceError;

/// Backend that supplies location records to a [`crate::LocationStore`].
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// All states, already in display order.
    async fn fetch_states(&self) -> Result<Vec<State>, SourceError>;

    async fn fetch_centers(&self) -> Result<Vec<Center>, SourceError>;

    /// Cities of one state. An unknown state yields an empty list or an error,
    /// depending on the backend.
    async fn fetch_cities(&self, state_id: &str) -> Result<Vec<City>, SourceError>;
}

#[async_trait]
impl<T: LocationSource + ?Sized> LocationSource for Arc<T> {
    async fn fetch_states(&self) -> Result<Vec<State>, SourceError> {
        (**self).fetch_states().await
    }

    async fn fetch_centers(&self) -> Result<Vec<Center>, SourceError> {
        (**self).fetch_centers().await
    }

    async fn fetch_cities(&self, state_id: &str) -> Result<Vec<City>, SourceError> {
        (**self).fetch_cities(state_id).await
    }
}
