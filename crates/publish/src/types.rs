//! Data types for the publish flow.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Delay between finalizing and the first review-state query.
pub const INITIAL_POLL_DELAY: Duration = Duration::from_secs(1);

/// Delay between review-state queries while no version record exists.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Raw publish input as collected by the command line.
///
/// Nothing here is validated yet; the orchestrator checks it in
/// [`Phase::Init`] before touching the file or the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub mod_id: String,
    pub file_path: PathBuf,
    pub changelog: String,
    /// Chunk size in bytes.
    pub chunk_size: u64,
    /// One of `alpha`, `beta`, `release`.
    pub stability: String,
}

/// Behavior knobs passed to the orchestrator at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    /// Wait after finalize before the first review-state query.
    pub initial_poll_delay: Duration,
    /// Wait between review-state queries.
    pub poll_interval: Duration,
    /// Give up polling after this long (outcome `Unknown`). `None` polls
    /// until the review state is known or the session is cancelled.
    pub poll_timeout: Option<Duration>,
    /// Maximum chunks in flight. `1` uploads strictly in part order.
    pub upload_concurrency: usize,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            initial_poll_delay: INITIAL_POLL_DELAY,
            poll_interval: POLL_INTERVAL,
            poll_timeout: None,
            upload_concurrency: 1,
        }
    }
}

/// How the registry handled the finalized version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Accepted without moderation.
    AutoApproved,
    /// Waiting for a virus scan or manual review.
    ManualReview,
    /// Polling failed, timed out or was cancelled.
    Unknown,
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AutoApproved => "auto-approved",
            Self::ManualReview => "manual review",
            Self::Unknown => "unknown",
        })
    }
}

/// State of an upload session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Creating,
    Uploading,
    Finalizing,
    Polling,
    Done(ReviewOutcome),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Creating => f.write_str("creating"),
            Self::Uploading => f.write_str("uploading"),
            Self::Finalizing => f.write_str("finalizing"),
            Self::Polling => f.write_str("polling"),
            Self::Done(outcome) => write!(f, "done ({outcome})"),
        }
    }
}

/// Progress event emitted while publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishEvent {
    /// The session entered a new phase.
    PhaseChanged { phase: Phase },
    /// A chunk was accepted by the transport.
    ChunkUploaded {
        part: u32,
        sent: usize,
        total: usize,
        bytes: u64,
    },
    /// Finalize returned `success = false`; polling continues anyway.
    FinalizeRejected,
    /// A review-state query found no version record yet.
    PollPending { attempt: u32 },
}

/// Summary of a session that reached [`Phase::Done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub mod_id: String,
    pub version_id: String,
    pub parts_uploaded: usize,
    pub bytes_uploaded: u64,
    /// The finalize call reported success.
    pub finalized: bool,
    pub outcome: ReviewOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_registry_timing() {
        let settings = PublishSettings::default();
        assert_eq!(settings.initial_poll_delay, Duration::from_secs(1));
        assert_eq!(settings.poll_interval, Duration::from_secs(10));
        assert_eq!(settings.poll_timeout, None);
        assert_eq!(settings.upload_concurrency, 1);
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Uploading.to_string(), "uploading");
        assert_eq!(
            Phase::Done(ReviewOutcome::ManualReview).to_string(),
            "done (manual review)"
        );
    }
}
