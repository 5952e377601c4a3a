//! Registry trait and its HTTP implementation.
//!
//! `ModRegistry` is what the orchestrator drives. The CLI passes a
//! [`modpub_api::Client`]; tests pass in-memory registries.

use std::future::Future;
use std::pin::Pin;

use modpub_api::Client;
use modpub_protocol::types::{NewVersion, VersionReviewState};
use modpub_transfer::MultipartEnvelope;
use tracing::{debug, warn};

/// Failure reported by a [`ModRegistry`] call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The request did not complete (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with an error.
    #[error("server error: {0}")]
    Server(String),
}

impl From<modpub_api::Error> for RegistryError {
    fn from(err: modpub_api::Error) -> Self {
        if err.is_transport() {
            Self::Transport(err.to_string())
        } else {
            Self::Server(err.to_string())
        }
    }
}

/// Boxed future returned by [`ModRegistry`] methods.
pub type RegistryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RegistryError>> + Send + 'a>>;

/// Remote operations needed to publish a version.
///
/// Using a trait keeps the state machine decoupled from HTTP and testable
/// with mocks.
pub trait ModRegistry: Send + Sync {
    /// Creates an empty version record and returns its id.
    fn create_version<'a>(&'a self, mod_id: &'a str) -> RegistryFuture<'a, String>;

    /// Sends one framed upload part.
    ///
    /// Only transport failures are errors; the response payload is not
    /// interpreted.
    fn upload_part(&self, envelope: MultipartEnvelope) -> RegistryFuture<'_, ()>;

    /// Finalizes the version. Returns the server's success flag.
    fn finalize_version<'a>(
        &'a self,
        mod_id: &'a str,
        version_id: &'a str,
        version: &'a NewVersion,
    ) -> RegistryFuture<'a, bool>;

    /// Queries the review state of a finalized version.
    fn check_upload_state<'a>(
        &'a self,
        mod_id: &'a str,
        version_id: &'a str,
    ) -> RegistryFuture<'a, VersionReviewState>;
}

impl ModRegistry for Client {
    fn create_version<'a>(&'a self, mod_id: &'a str) -> RegistryFuture<'a, String> {
        Box::pin(async move { Ok(Client::create_version(self, mod_id).await?) })
    }

    fn upload_part(&self, envelope: MultipartEnvelope) -> RegistryFuture<'_, ()> {
        Box::pin(async move {
            let part = envelope.part_number;
            let resp = self
                .send_multipart(envelope.body, &envelope.content_type)
                .await?;

            if resp.is_success() {
                debug!(part, status = resp.status, "part accepted");
            } else {
                warn!(
                    part,
                    status = resp.status,
                    body = %String::from_utf8_lossy(&resp.body),
                    "part upload returned an error status"
                );
            }
            Ok(())
        })
    }

    fn finalize_version<'a>(
        &'a self,
        mod_id: &'a str,
        version_id: &'a str,
        version: &'a NewVersion,
    ) -> RegistryFuture<'a, bool> {
        Box::pin(async move {
            Ok(self
                .finalize_create_version(mod_id, version_id, version)
                .await?)
        })
    }

    fn check_upload_state<'a>(
        &'a self,
        mod_id: &'a str,
        version_id: &'a str,
    ) -> RegistryFuture<'a, VersionReviewState> {
        Box::pin(async move { Ok(self.check_version_upload_state(mod_id, version_id).await?) })
    }
}
