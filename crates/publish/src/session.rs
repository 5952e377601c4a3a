//! Upload target and per-session state.

use std::path::Path;

use modpub_protocol::types::{NewVersion, Stability};
use modpub_transfer::{ArtifactInfo, ChunkDescriptor, ChunkPlan};
use tracing::debug;

use crate::types::Phase;

/// The artifact being published and what to publish it as.
///
/// Built once from validated input and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    mod_id: String,
    changelog: String,
    stability: Stability,
    artifact: ArtifactInfo,
}

impl UploadTarget {
    pub fn new(
        mod_id: impl Into<String>,
        changelog: impl Into<String>,
        stability: Stability,
        artifact: ArtifactInfo,
    ) -> Self {
        Self {
            mod_id: mod_id.into(),
            changelog: changelog.into(),
            stability,
            artifact,
        }
    }

    pub fn mod_id(&self) -> &str {
        &self.mod_id
    }

    pub fn changelog(&self) -> &str {
        &self.changelog
    }

    pub fn stability(&self) -> Stability {
        self.stability
    }

    /// Absolute path of the artifact.
    pub fn path(&self) -> &Path {
        &self.artifact.path
    }

    pub fn size(&self) -> u64 {
        self.artifact.size
    }

    pub fn file_name(&self) -> &str {
        &self.artifact.file_name
    }

    /// Finalize input for this target.
    pub fn new_version(&self) -> NewVersion {
        NewVersion {
            changelog: self.changelog.clone(),
            stability: self.stability,
        }
    }
}

/// Mutable state of one publish run, owned by the orchestrator.
#[derive(Debug)]
pub struct UploadSession {
    mod_id: String,
    version_id: Option<String>,
    plan: ChunkPlan,
    current_chunk_index: usize,
    bytes_sent: u64,
    phase: Phase,
}

impl UploadSession {
    pub fn new(mod_id: impl Into<String>, plan: ChunkPlan) -> Self {
        Self {
            mod_id: mod_id.into(),
            version_id: None,
            plan,
            current_chunk_index: 0,
            bytes_sent: 0,
            phase: Phase::Init,
        }
    }

    pub fn mod_id(&self) -> &str {
        &self.mod_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn plan(&self) -> &ChunkPlan {
        &self.plan
    }

    /// Server-assigned version id; `None` until creation succeeded.
    #[cfg(test)]
    pub(crate) fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    /// Number of chunks the transport has accepted.
    pub fn current_chunk_index(&self) -> usize {
        self.current_chunk_index
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// True once every planned chunk has been sent.
    pub fn is_fully_uploaded(&self) -> bool {
        self.current_chunk_index == self.plan.len()
    }

    pub(crate) fn enter(&mut self, phase: Phase) {
        debug!(mod_id = %self.mod_id, from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
    }

    /// Records the version id and returns the one in effect. Set once;
    /// later calls keep the first id.
    pub(crate) fn assign_version(&mut self, version_id: String) -> &str {
        self.version_id.get_or_insert(version_id)
    }

    /// Records that `chunk`'s transport call returned successfully.
    pub(crate) fn record_sent(&mut self, chunk: &ChunkDescriptor) {
        self.current_chunk_index += 1;
        self.bytes_sent += chunk.length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modpub_transfer::{ChunkSize, plan};
    use std::path::PathBuf;

    fn session(total: u64) -> UploadSession {
        UploadSession::new("m", plan(total, ChunkSize::new(1_000_000).unwrap()))
    }

    #[test]
    fn new_session_starts_in_init() {
        let s = session(2_500_000);
        assert_eq!(s.phase(), Phase::Init);
        assert_eq!(s.version_id(), None);
        assert_eq!(s.current_chunk_index(), 0);
        assert_eq!(s.plan().len(), 3);
        assert!(!s.is_fully_uploaded());
    }

    #[test]
    fn version_id_is_immutable_once_set() {
        let mut s = session(10);
        assert_eq!(s.assign_version("v1".into()), "v1");
        assert_eq!(s.assign_version("v2".into()), "v1");
        assert_eq!(s.version_id(), Some("v1"));
    }

    #[test]
    fn record_sent_advances_index_and_bytes() {
        let mut s = session(2_500_000);
        let chunks: Vec<_> = s.plan().iter().copied().collect();
        for chunk in &chunks {
            s.record_sent(chunk);
        }
        assert_eq!(s.current_chunk_index(), 3);
        assert_eq!(s.bytes_sent(), 2_500_000);
        assert!(s.is_fully_uploaded());
    }

    #[test]
    fn target_builds_finalize_input() {
        let target = UploadTarget::new(
            "AreaActions",
            "Fixed belts",
            Stability::Alpha,
            ArtifactInfo {
                path: PathBuf::from("/tmp/AreaActions.smod"),
                size: 42,
                file_name: "AreaActions.smod".into(),
            },
        );
        assert_eq!(target.file_name(), "AreaActions.smod");
        assert_eq!(target.size(), 42);
        assert_eq!(
            target.new_version(),
            NewVersion {
                changelog: "Fixed belts".into(),
                stability: Stability::Alpha,
            }
        );
    }
}
