use std::time::Duration;

use modpub_protocol::constants::{DEFAULT_API_BASE, DEFAULT_GRAPHQL_PATH};

/// Connection settings for [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Scheme and host, e.g. `https://api.ficsit.app`.
    pub api_base: String,
    /// Path of the GraphQL endpoint, e.g. `/v2/query`.
    pub graphql_path: String,
    /// Sent verbatim as the `Authorization` header. Empty means anonymous.
    pub api_key: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            graphql_path: DEFAULT_GRAPHQL_PATH.to_string(),
            api_key: String::new(),
            request_timeout: None,
        }
    }
}

impl ApiConfig {
    /// Full GraphQL endpoint URL (`<api-base><graphql-path>`).
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_base, self.graphql_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint() {
        assert_eq!(ApiConfig::default().endpoint(), "https://api.ficsit.app/v2/query");
    }

    #[test]
    fn endpoint_is_plain_concatenation() {
        let config = ApiConfig {
            api_base: "http://localhost:8080".into(),
            graphql_path: "/graphql".into(),
            ..ApiConfig::default()
        };
        assert_eq!(config.endpoint(), "http://localhost:8080/graphql");
    }
}
