use std::path::Path;

use async_trait::async_trait;
use ridedesk_core::{load_locations_file, Center, City, LocationsFile, State};

use crate::error::SourceError;
use crate::source::LocationSource;

/// Serves locations from a YAML file loaded once at startup.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    file: LocationsFile,
}

impl FixtureSource {
    #[must_use]
    pub fn new(file: LocationsFile) -> Self {
        Self { file }
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Fixture`] if the file cannot be read or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let file = load_locations_file(path)?;
        tracing::info!(
            path = %path.display(),
            states = file.states.len(),
            cities = file.cities.len(),
            centers = file.centers.len(),
            "loaded locations fixture"
        );
        Ok(Self::new(file))
    }
}

#[async_trait]
impl LocationSource for FixtureSource {
    async fn fetch_states(&self) -> Result<Vec<State>, SourceError> {
        Ok(self.file.states.clone())
    }

    async fn fetch_centers(&self) -> Result<Vec<Center>, SourceError> {
        Ok(self.file.centers.clone())
    }

    async fn fetch_cities(&self, state_id: &str) -> Result<Vec<City>, SourceError> {
        Ok(self.file.cities_of(state_id))
    }
}
