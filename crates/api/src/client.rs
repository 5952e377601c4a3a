//! Mod repository API client.
//!
//! Async HTTP client using `reqwest` with the API key sent as a raw
//! `Authorization` header.

use modpub_protocol::constants::{
    CHECK_VERSION_UPLOAD_STATE, CREATE_VERSION, FINALIZE_CREATE_VERSION,
};
use modpub_protocol::messages::{
    CheckVersionUploadStateData, CheckVersionUploadStateVariables, CreateVersionData,
    CreateVersionVariables, FinalizeCreateVersionData, FinalizeCreateVersionVariables,
    GraphqlError, GraphqlRequest, GraphqlResponse,
};
use modpub_protocol::types::{NewVersion, VersionReviewState};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::config::ApiConfig;

/// Errors from the API client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GraphQL error: {}", join_messages(.0))]
    Graphql(Vec<GraphqlError>),

    #[error("response contained no data")]
    MissingData,

    #[error("invalid API key")]
    InvalidKey,
}

impl Error {
    /// True when the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

fn join_messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Status and body of a request whose payload is not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Mod repository API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoint: String,
}

impl Client {
    /// Creates a client for the endpoint described by `config`.
    pub fn new(config: &ApiConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            let mut value =
                HeaderValue::from_str(&config.api_key).map_err(|_| Error::InvalidKey)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("modpub/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: config.endpoint(),
        })
    }

    /// The GraphQL endpoint every request is posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts a pre-framed multipart body.
    ///
    /// The response is returned as-is: a GraphQL error inside a 200, or a
    /// non-success status, is not an `Err`. Only failures to complete the
    /// exchange (connection, TLS, timeout, reading the body) are.
    pub async fn send_multipart(
        &self,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<RawResponse, Error> {
        let len = body.len();
        let resp = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        trace!(status, request_bytes = len, response_bytes = body.len(), "multipart request finished");

        Ok(RawResponse { status, body })
    }

    /// Runs a GraphQL operation and decodes its `data`.
    pub async fn execute<V, T>(&self, query: &str, variables: V) -> Result<T, Error>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let request = GraphqlRequest::new(query, variables);
        let resp = self.http.post(&self.endpoint).json(&request).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        let parsed: GraphqlResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(Error::Api {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !parsed.errors.is_empty() {
            return Err(Error::Graphql(parsed.errors));
        }
        parsed.data.ok_or(Error::MissingData)
    }

    /// Creates an empty version for `mod_id` and returns its id.
    pub async fn create_version(&self, mod_id: &str) -> Result<String, Error> {
        let data: CreateVersionData = self
            .execute(
                CREATE_VERSION,
                CreateVersionVariables {
                    mod_id: mod_id.to_string(),
                },
            )
            .await?;
        debug!(mod_id, version_id = %data.version_id, "version created");
        Ok(data.version_id)
    }

    /// Finalizes an uploaded version. Returns the server's success flag.
    pub async fn finalize_create_version(
        &self,
        mod_id: &str,
        version_id: &str,
        version: &NewVersion,
    ) -> Result<bool, Error> {
        let data: FinalizeCreateVersionData = self
            .execute(
                FINALIZE_CREATE_VERSION,
                FinalizeCreateVersionVariables {
                    mod_id: mod_id.to_string(),
                    version_id: version_id.to_string(),
                    version: version.clone(),
                },
            )
            .await?;
        Ok(data.success)
    }

    /// Fetches the review state of a finalized version.
    pub async fn check_version_upload_state(
        &self,
        mod_id: &str,
        version_id: &str,
    ) -> Result<VersionReviewState, Error> {
        let data: CheckVersionUploadStateData = self
            .execute(
                CHECK_VERSION_UPLOAD_STATE,
                CheckVersionUploadStateVariables {
                    mod_id: mod_id.to_string(),
                    version_id: version_id.to_string(),
                },
            )
            .await?;
        Ok(data.into_review_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use modpub_protocol::types::Stability;
    use serde_json::json;

    fn client_for(server: &MockServer, api_key: &str) -> Client {
        Client::new(&ApiConfig {
            api_base: server.base_url(),
            api_key: api_key.into(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn create_version_returns_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/query")
                    .header("authorization", "secret-key")
                    .header("content-type", "application/json")
                    .body_contains("mutation CreateVersion")
                    .body_contains(r#""modId":"AreaActions""#);
                then.status(200)
                    .json_body(json!({ "data": { "versionID": "7hX2" } }));
            })
            .await;

        let client = client_for(&server, "secret-key");
        let id = client.create_version("AreaActions").await.unwrap();

        mock.assert_async().await;
        assert_eq!(id, "7hX2");
    }

    #[tokio::test]
    async fn request_timeout_is_a_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/query");
                then.status(200)
                    .delay(std::time::Duration::from_secs(5))
                    .json_body(json!({ "data": { "versionID": "late" } }));
            })
            .await;

        let client = Client::new(&ApiConfig {
            api_base: server.base_url(),
            request_timeout: Some(std::time::Duration::from_millis(100)),
            ..ApiConfig::default()
        })
        .unwrap();

        let err = client.create_version("AreaActions").await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn graphql_errors_are_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/query");
                then.status(200).json_body(json!({
                    "data": null,
                    "errors": [{ "message": "user not authorized to perform this action" }]
                }));
            })
            .await;

        let client = client_for(&server, "k");
        let err = client.create_version("m").await.unwrap_err();
        assert!(matches!(err, Error::Graphql(ref e) if e.len() == 1));
        assert!(err.to_string().contains("not authorized"));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn non_json_error_status_is_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/query");
                then.status(502).body("bad gateway");
            })
            .await;

        let client = client_for(&server, "k");
        let err = client.create_version("m").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 502, ref body } if body == "bad gateway"));
    }

    #[tokio::test]
    async fn finalize_sends_changelog_and_stability() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/query")
                    .body_contains("mutation FinalizeCreateVersion")
                    .body_contains(r#""changelog":"Fixed belts""#)
                    .body_contains(r#""stability":"BETA""#)
                    .body_contains(r#""versionId":"v1""#);
                then.status(200)
                    .json_body(json!({ "data": { "success": false } }));
            })
            .await;

        let client = client_for(&server, "k");
        let version = NewVersion {
            changelog: "Fixed belts".into(),
            stability: Stability::Beta,
        };
        let success = client
            .finalize_create_version("m", "v1", &version)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(!success);
    }

    #[tokio::test]
    async fn upload_state_null_is_pending() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/query")
                    .body_contains("query CheckVersionUploadState");
                then.status(200).json_body(json!({ "data": { "state": null } }));
            })
            .await;

        let client = client_for(&server, "k");
        let state = client.check_version_upload_state("m", "v1").await.unwrap();
        assert_eq!(state, VersionReviewState::pending());
    }

    #[tokio::test]
    async fn upload_state_auto_approved() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/query");
                then.status(200).json_body(json!({
                    "data": { "state": { "auto_approved": true, "version": { "id": "v1" } } }
                }));
            })
            .await;

        let client = client_for(&server, "k");
        let state = client.check_version_upload_state("m", "v1").await.unwrap();
        assert!(state.has_version);
        assert!(state.auto_approved);
        assert_eq!(state.version_id, "v1");
    }

    #[tokio::test]
    async fn multipart_posts_body_verbatim() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/query")
                    .header("authorization", "secret-key")
                    .header("content-type", "multipart/form-data; boundary=xyz")
                    .body("--xyz--\r\n");
                then.status(200).body(r#"{"data":{"uploadVersionPart":true}}"#);
            })
            .await;

        let client = client_for(&server, "secret-key");
        let resp = client
            .send_multipart(b"--xyz--\r\n".to_vec(), "multipart/form-data; boundary=xyz")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(resp.is_success());
        assert_eq!(resp.body, br#"{"data":{"uploadVersionPart":true}}"#);
    }

    #[tokio::test]
    async fn multipart_server_errors_are_not_failures() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/query");
                then.status(500).body("internal error");
            })
            .await;

        let client = client_for(&server, "k");
        let resp = client
            .send_multipart(Vec::new(), "multipart/form-data; boundary=b")
            .await
            .unwrap();
        assert_eq!(resp.status, 500);
        assert!(!resp.is_success());
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let client = Client::new(&ApiConfig {
            api_base: "http://127.0.0.1:1".into(),
            ..ApiConfig::default()
        })
        .unwrap();

        let err = client
            .send_multipart(b"x".to_vec(), "multipart/form-data; boundary=b")
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn invalid_api_key_rejected() {
        let result = Client::new(&ApiConfig {
            api_key: "bad\nkey".into(),
            ..ApiConfig::default()
        });
        assert!(matches!(result, Err(Error::InvalidKey)));
    }
}
