use thiserror::Error;

/// Failures talking to the location backend. The store records these as
/// "upstream unavailable" instead of surfacing them through option lists.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("locations fixture error: {0}")]
    Fixture(#[from] ridedesk_core::ConfigError),
}

/// Lookup failures that are not plain "not found".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Name-mode lookups refuse to guess between records sharing a name.
    #[error("{kind} name '{name}' is ambiguous: {matches} records share it")]
    AmbiguousName {
        kind: &'static str,
        name: String,
        matches: usize,
    },
}
