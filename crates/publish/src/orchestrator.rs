//! Publish orchestrator.
//!
//! Drives one upload session through its phases, emits progress events,
//! and supports cancellation between remote calls.

use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use modpub_protocol::types::Stability;
use modpub_transfer::{
    ChunkDescriptor, ChunkPlan, ChunkReader, ChunkSize, EnvelopeBuilder, TransferError,
    inspect_artifact, plan,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::PublishError;
use crate::registry::{ModRegistry, RegistryError};
use crate::session::{UploadSession, UploadTarget};
use crate::types::{Phase, PublishEvent, PublishReport, PublishRequest, PublishSettings, ReviewOutcome};

/// Capacity of the progress event channel. Events beyond it are dropped.
const EVENT_CAPACITY: usize = 256;

/// Publishes mod versions against a [`ModRegistry`].
pub struct PublishOrchestrator {
    settings: PublishSettings,
    events_tx: mpsc::Sender<PublishEvent>,
    events_rx: Option<mpsc::Receiver<PublishEvent>>,
    cancel: CancellationToken,
}

impl Default for PublishOrchestrator {
    fn default() -> Self {
        Self::new(PublishSettings::default())
    }
}

impl PublishOrchestrator {
    /// Creates a new orchestrator.
    pub fn new(settings: PublishSettings) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
        Self {
            settings,
            events_tx,
            events_rx: Some(events_rx),
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<PublishEvent>> {
        self.events_rx.take()
    }

    /// Returns the cancellation token for this orchestrator.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// Runs the full publish pipeline.
    ///
    /// Errors before and during the upload abort the session; nothing is
    /// cleaned up on the server. Once the version is finalized the call
    /// succeeds, with [`ReviewOutcome::Unknown`] if the review state could
    /// not be determined.
    pub async fn publish(
        &self,
        registry: &dyn ModRegistry,
        request: PublishRequest,
    ) -> Result<PublishReport, PublishError> {
        // 1. Init
        let (target, plan) = self.prepare(&request)?;
        let mut session = UploadSession::new(target.mod_id(), plan);
        self.check_cancelled()?;

        info!(
            mod_id = %target.mod_id(),
            path = %target.path().display(),
            bytes = target.size(),
            chunks = session.plan().len(),
            "creating a new mod version"
        );

        // 2. Create
        self.transition(&mut session, Phase::Creating);
        let created = registry
            .create_version(target.mod_id())
            .await
            .map_err(|source| PublishError::Remote {
                step: "create version",
                source,
            })?;
        if created.trim().is_empty() {
            return Err(PublishError::Remote {
                step: "create version",
                source: RegistryError::Server("server returned an empty version id".into()),
            });
        }
        let version_id = session.assign_version(created).to_owned();
        info!(mod_id = %session.mod_id(), version_id = %version_id, "received version id");

        // 3. Upload
        self.transition(&mut session, Phase::Uploading);
        self.upload_chunks(registry, &target, &mut session, &version_id)
            .await?;
        debug_assert!(session.is_fully_uploaded());

        // 4. Finalize
        self.check_cancelled()?;
        self.transition(&mut session, Phase::Finalizing);
        let finalized = self.finalize(registry, &target, &version_id).await?;

        // 5. Poll
        self.transition(&mut session, Phase::Polling);
        let outcome = self
            .poll_review_state(registry, target.mod_id(), &version_id)
            .await;
        self.transition(&mut session, Phase::Done(outcome));

        Ok(PublishReport {
            mod_id: session.mod_id().to_string(),
            version_id,
            parts_uploaded: session.current_chunk_index(),
            bytes_uploaded: session.bytes_sent(),
            finalized,
            outcome,
        })
    }

    /// Validates the request and plans the upload. No network access.
    fn prepare(&self, request: &PublishRequest) -> Result<(UploadTarget, ChunkPlan), PublishError> {
        let chunk_size = ChunkSize::new(request.chunk_size)
            .map_err(|e| PublishError::Configuration(e.to_string()))?;
        let stability: Stability = request
            .stability
            .parse()
            .map_err(|e: modpub_protocol::ParseStabilityError| {
                PublishError::Configuration(e.to_string())
            })?;
        if request.mod_id.trim().is_empty() {
            return Err(PublishError::Configuration("mod id cannot be empty".into()));
        }
        if self.settings.upload_concurrency == 0 {
            return Err(PublishError::Configuration(
                "upload concurrency must be at least 1".into(),
            ));
        }

        let artifact =
            inspect_artifact(&request.file_path).map_err(|source| PublishError::FileSystem {
                path: request.file_path.clone(),
                source,
            })?;

        let plan = plan(artifact.size, chunk_size);
        let target = UploadTarget::new(&request.mod_id, &request.changelog, stability, artifact);
        Ok((target, plan))
    }

    /// Uploads every planned chunk.
    ///
    /// At most `upload_concurrency` chunks are in flight; with the default
    /// of one, chunks go out strictly in part order and the next chunk is
    /// not read until the previous send returned. The first failure drops
    /// every in-flight send.
    async fn upload_chunks(
        &self,
        registry: &dyn ModRegistry,
        target: &UploadTarget,
        session: &mut UploadSession,
        version_id: &str,
    ) -> Result<(), PublishError> {
        let reader = ChunkReader::new(target.path());
        let envelopes = EnvelopeBuilder::new();
        let chunks: Vec<ChunkDescriptor> = session.plan().iter().copied().collect();
        let total = chunks.len();

        let mut uploads = stream::iter(chunks)
            .map(|chunk| self.upload_chunk(registry, &reader, &envelopes, target, version_id, chunk))
            .buffer_unordered(self.settings.upload_concurrency);

        while let Some(result) = uploads.next().await {
            let chunk = result?;
            session.record_sent(&chunk);
            self.emit(PublishEvent::ChunkUploaded {
                part: chunk.part_number,
                sent: session.current_chunk_index(),
                total,
                bytes: chunk.length,
            });
        }

        debug!(
            mod_id = %target.mod_id(),
            version_id,
            parts = session.current_chunk_index(),
            bytes = session.bytes_sent(),
            "all parts uploaded"
        );
        Ok(())
    }

    /// Reads, frames and sends one chunk.
    async fn upload_chunk(
        &self,
        registry: &dyn ModRegistry,
        reader: &ChunkReader,
        envelopes: &EnvelopeBuilder,
        target: &UploadTarget,
        version_id: &str,
        chunk: ChunkDescriptor,
    ) -> Result<ChunkDescriptor, PublishError> {
        self.check_cancelled()?;

        let part = chunk.part_number;
        info!(
            mod_id = %target.mod_id(),
            version_id,
            part,
            offset = chunk.offset,
            bytes = chunk.length,
            "uploading chunk"
        );

        let data = tokio::task::spawn_blocking({
            let reader = reader.clone();
            move || reader.read_chunk(&chunk)
        })
        .await
        .map_err(|e| PublishError::ChunkRead {
            part,
            source: TransferError::Io(std::io::Error::other(e)),
        })?
        .map_err(|source| PublishError::ChunkRead { part, source })?;

        let envelope = envelopes
            .build(target.mod_id(), version_id, part, &data, target.file_name())
            .map_err(|source| PublishError::ChunkRead { part, source })?;
        drop(data);

        registry
            .upload_part(envelope)
            .await
            .map_err(|source| PublishError::Transport { part, source })?;

        Ok(chunk)
    }

    /// Finalizes the version. `success = false` is logged, not fatal.
    async fn finalize(
        &self,
        registry: &dyn ModRegistry,
        target: &UploadTarget,
        version_id: &str,
    ) -> Result<bool, PublishError> {
        info!(
            mod_id = %target.mod_id(),
            version_id,
            stability = %target.stability(),
            "finalizing uploaded version"
        );

        let version = target.new_version();
        let success = registry
            .finalize_version(target.mod_id(), version_id, &version)
            .await
            .map_err(|source| PublishError::Remote {
                step: "finalize version",
                source,
            })?;

        if !success {
            warn!(
                mod_id = %target.mod_id(),
                version_id,
                "failed to finalize version upload"
            );
            self.emit(PublishEvent::FinalizeRejected);
        }
        Ok(success)
    }

    /// Polls until the registry reports a version record.
    ///
    /// Never fails: query errors, cancellation and the optional poll
    /// timeout all end in [`ReviewOutcome::Unknown`].
    async fn poll_review_state(
        &self,
        registry: &dyn ModRegistry,
        mod_id: &str,
        version_id: &str,
    ) -> ReviewOutcome {
        let deadline = self.settings.poll_timeout.map(|t| Instant::now() + t);
        let mut delay = self.settings.initial_poll_delay;
        let mut attempt: u32 = 0;

        loop {
            if !self.pause(delay, deadline).await {
                warn!(mod_id, version_id, attempt, "stopped waiting for version review state");
                return ReviewOutcome::Unknown;
            }

            attempt += 1;
            info!(mod_id, version_id, attempt, "checking version upload state");

            match registry.check_upload_state(mod_id, version_id).await {
                Err(e) => {
                    error!(mod_id, version_id, error = %e, "failed to check version upload state");
                    return ReviewOutcome::Unknown;
                }
                Ok(state) if !state.has_version => {
                    debug!(mod_id, version_id, attempt, "version not processed yet");
                    self.emit(PublishEvent::PollPending { attempt });
                    delay = self.settings.poll_interval;
                }
                Ok(state) if state.auto_approved => {
                    info!(mod_id, version_id, "version successfully uploaded and auto-approved");
                    return ReviewOutcome::AutoApproved;
                }
                Ok(_) => {
                    info!(
                        mod_id,
                        version_id,
                        "version successfully uploaded, but has to be scanned for viruses, which may take up to 15 minutes"
                    );
                    return ReviewOutcome::ManualReview;
                }
            }
        }
    }

    /// Sleeps for `delay`. Returns false if cancelled, or if `deadline`
    /// falls before the wake-up time (after sleeping until the deadline).
    async fn pause(&self, delay: Duration, deadline: Option<Instant>) -> bool {
        let wake = Instant::now() + delay;
        let expires = deadline.is_some_and(|d| d < wake);
        let until = match deadline {
            Some(d) if expires => d,
            _ => wake,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep_until(until) => !expires,
        }
    }

    fn transition(&self, session: &mut UploadSession, phase: Phase) {
        session.enter(phase);
        self.emit(PublishEvent::PhaseChanged {
            phase: session.phase(),
        });
    }

    fn check_cancelled(&self) -> Result<(), PublishError> {
        if self.cancel.is_cancelled() {
            Err(PublishError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn emit(&self, event: PublishEvent) {
        let _ = self.events_tx.try_send(event);
    }
}
