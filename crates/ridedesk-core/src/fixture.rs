//! Offline location data loaded from a YAML file.
//!
//! The layout mirrors what the backend serves:
//!
//! ```yaml
//! states:
//!   - { id: s1, name: Texas }
//! cities:
//!   - { id: c1, name: Austin, stateId: s1 }
//! centers:
//!   - { id: ctr1, name: Downtown Hub }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::locations::{Center, City, State};
use crate::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationsFile {
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub cities: Vec<City>,
    #[serde(default)]
    pub centers: Vec<Center>,
}

impl LocationsFile {
    /// Cities of one state, in file order.
    #[must_use]
    pub fn cities_of(&self, state_id: &str) -> Vec<City> {
        self.cities
            .iter()
            .filter(|c| c.state_id == state_id)
            .cloned()
            .collect()
    }
}

/// Load and validate a locations file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_locations_file(path: &Path) -> Result<LocationsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FixtureIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_locations(&content)
}

/// Parse and validate locations YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_locations(content: &str) -> Result<LocationsFile, ConfigError> {
    let file: LocationsFile = serde_yaml::from_str(content).map_err(ConfigError::FixtureParse)?;
    validate_locations(&file)?;
    Ok(file)
}

fn validate_locations(file: &LocationsFile) -> Result<(), ConfigError> {
    let mut state_ids = HashSet::new();
    for state in &file.states {
        require_non_empty("state", &state.id, &state.name)?;
        if !state_ids.insert(state.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate state id: '{}'",
                state.id
            )));
        }
    }

    let mut city_ids = HashSet::new();
    for city in &file.cities {
        require_non_empty("city", &city.id, &city.name)?;
        if !city_ids.insert(city.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate city id: '{}'",
                city.id
            )));
        }
        if !state_ids.contains(city.state_id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "city '{}' references unknown state '{}'",
                city.name, city.state_id
            )));
        }
    }

    let mut center_ids = HashSet::new();
    for center in &file.centers {
        require_non_empty("center", &center.id, &center.name)?;
        if !center_ids.insert(center.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate center id: '{}'",
                center.id
            )));
        }
    }

    Ok(())
}

fn require_non_empty(kind: &str, id: &str, name: &str) -> Result<(), ConfigError> {
    if id.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{kind} id must be non-empty (name '{name}')"
        )));
    }
    if name.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{kind} '{id}' has an empty name"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r"
states:
  - { id: s1, name: Texas }
  - { id: s2, name: Ohio }
cities:
  - { id: c1, name: Austin, stateId: s1 }
  - { id: c2, name: Columbus, stateId: s2 }
  - { id: c3, name: Houston, stateId: s1 }
centers:
  - { id: ctr1, name: Downtown Hub }
";

    #[test]
    fn parses_sample_file() {
        let file = parse_locations(SAMPLE).unwrap();
        assert_eq!(file.states.len(), 2);
        assert_eq!(file.cities.len(), 3);
        assert_eq!(file.centers[0].name, "Downtown Hub");
    }

    #[test]
    fn cities_of_filters_by_parent_in_file_order() {
        let file = parse_locations(SAMPLE).unwrap();
        let names: Vec<_> = file.cities_of("s1").into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Austin", "Houston"]);
        assert!(file.cities_of("missing").is_empty());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let file = parse_locations("states: []\n").unwrap();
        assert!(file.cities.is_empty());
        assert!(file.centers.is_empty());
    }

    #[test]
    fn rejects_duplicate_state_id() {
        let yaml = "states:\n  - { id: s1, name: Texas }\n  - { id: s1, name: Ohio }\n";
        let err = parse_locations(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate state id"));
    }

    #[test]
    fn rejects_city_with_unknown_state() {
        let yaml = "states:\n  - { id: s1, name: Texas }\ncities:\n  - { id: c1, name: Reno, stateId: s9 }\n";
        let err = parse_locations(yaml).unwrap_err();
        assert!(err.to_string().contains("unknown state 's9'"));
    }

    #[test]
    fn rejects_empty_name() {
        let yaml = "centers:\n  - { id: ctr1, name: '  ' }\n";
        let err = parse_locations(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = parse_locations("states: [ {").unwrap_err();
        assert!(matches!(err, ConfigError::FixtureParse(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(SAMPLE.as_bytes()).unwrap();
        let file = load_locations_file(tmp.path()).unwrap();
        assert_eq!(file.states[1].name, "Ohio");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_locations_file(Path::new("/nonexistent/locations.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FixtureIo { .. }));
    }
}
