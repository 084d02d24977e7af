use super::*;

fn test_client(base_url: &str) -> LocationClient {
    LocationClient::new(base_url, 30).expect("client construction should not fail")
}

#[test]
fn endpoint_url_keeps_base_path() {
    let client = test_client("https://api.example.test/v1");
    let url = client.endpoint_url(&["states"]);
    assert_eq!(url.as_str(), "https://api.example.test/v1/states");
}

#[test]
fn endpoint_url_strips_trailing_slash() {
    let client = test_client("https://api.example.test/v1/");
    let url = client.endpoint_url(&["states", "s1", "cities"]);
    assert_eq!(url.as_str(), "https://api.example.test/v1/states/s1/cities");
}

#[test]
fn endpoint_url_encodes_state_id() {
    let client = test_client("https://api.example.test");
    let url = client.endpoint_url(&["states", "new york/ny", "cities"]);
    assert_eq!(
        url.as_str(),
        "https://api.example.test/states/new%20york%2Fny/cities"
    );
}

#[test]
fn rejects_non_http_base_url() {
    let result = LocationClient::new("mailto:ops@example.test", 30);
    assert!(matches!(result, Err(SourceError::InvalidBaseUrl { .. })));
}

#[test]
fn rejects_unparseable_base_url() {
    let result = LocationClient::new("not a url", 30);
    assert!(matches!(result, Err(SourceError::InvalidBaseUrl { .. })));
}
