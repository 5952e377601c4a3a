use serde::{Deserialize, Serialize};

use crate::types::{NewVersion, VersionReviewState};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A GraphQL request body (`{"query": ..., "variables": ...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlRequest<V> {
    pub query: String,
    pub variables: V,
}

impl<V> GraphqlRequest<V> {
    pub fn new(query: impl Into<String>, variables: V) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// A GraphQL response body.
///
/// `data` may be absent or partial when `errors` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<serde_json::Value>,
}

impl std::fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            return f.write_str(&self.message);
        }
        let path: Vec<String> = self
            .path
            .iter()
            .map(|segment| match segment {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        write!(f, "{} (at {})", self.message, path.join("."))
    }
}

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionVariables {
    pub mod_id: String,
}

/// Variables of the upload-part mutation.
///
/// `file` is always `null`: the multipart `map` document points the server
/// at the form part holding the bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadVersionPartVariables {
    pub mod_id: String,
    pub version_id: String,
    pub part: u32,
    pub file: Option<()>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeCreateVersionVariables {
    pub mod_id: String,
    pub version_id: String,
    pub version: NewVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckVersionUploadStateVariables {
    pub mod_id: String,
    pub version_id: String,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVersionData {
    #[serde(rename = "versionID")]
    pub version_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeCreateVersionData {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckVersionUploadStateData {
    #[serde(default)]
    pub state: Option<VersionUploadState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionUploadState {
    #[serde(default)]
    pub auto_approved: bool,
    #[serde(default)]
    pub version: Option<VersionRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRef {
    pub id: String,
}

impl CheckVersionUploadStateData {
    /// Collapses the nullable response into a review snapshot.
    ///
    /// A missing state, a missing version or an empty version id all mean
    /// the server has not produced the version record yet.
    pub fn into_review_state(self) -> VersionReviewState {
        let Some(state) = self.state else {
            return VersionReviewState::pending();
        };
        match state.version {
            Some(version) if !version.id.is_empty() => VersionReviewState {
                version_id: version.id,
                has_version: true,
                auto_approved: state.auto_approved,
            },
            _ => VersionReviewState::pending(),
        }
    }
}
