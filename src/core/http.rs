use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

const APP_USER_AGENT: &str = concat!("IdeConfigHelper/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout for release lookups and mirror probes.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .timeout(timeout)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_carries_package_version() {
        assert!(APP_USER_AGENT.starts_with("IdeConfigHelper/"));
        assert!(APP_USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
        assert!(build_http_client(HTTP_TIMEOUT).is_ok());
    }
}
