//! Location records served by the dashboard backend.
//!
//! States and centers are loaded once per session; cities are loaded per
//! state. A [`City`] refers to its parent only through `state_id`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub name: String,
    pub state_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Center {
    pub id: String,
    pub name: String,
}

/// The active dropdown selection, always expressed in ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub state_id: Option<String>,
    pub city_id: Option<String>,
}

impl Selection {
    /// Replace the state and drop the city in one step.
    ///
    /// Re-choosing the current state keeps the city. Returns `true` when the
    /// state actually changed.
    pub fn choose_state(&mut self, state_id: &str) -> bool {
        if self.state_id.as_deref() == Some(state_id) {
            return false;
        }
        self.state_id = Some(state_id.to_owned());
        self.city_id = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_deserializes_camel_case_state_id() {
        let city: City =
            serde_json::from_str(r#"{"id":"c1","name":"Austin","stateId":"s1"}"#).unwrap();
        assert_eq!(city.state_id, "s1");
    }

    #[test]
    fn choose_state_clears_city() {
        let mut selection = Selection {
            state_id: Some("s1".to_string()),
            city_id: Some("c1".to_string()),
        };
        assert!(selection.choose_state("s2"));
        assert_eq!(selection.state_id.as_deref(), Some("s2"));
        assert!(selection.city_id.is_none());
    }

    #[test]
    fn choose_same_state_keeps_city() {
        let mut selection = Selection {
            state_id: Some("s1".to_string()),
            city_id: Some("c1".to_string()),
        };
        assert!(!selection.choose_state("s1"));
        assert_eq!(selection.city_id.as_deref(), Some("c1"));
    }
}
