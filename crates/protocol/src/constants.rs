/// Base URL of the public mod repository API.
pub const DEFAULT_API_BASE: &str = "https://api.ficsit.app";

/// Path of the GraphQL endpoint relative to [`DEFAULT_API_BASE`].
pub const DEFAULT_GRAPHQL_PATH: &str = "/v2/query";

/// Creates an empty version record and returns its identifier.
pub const CREATE_VERSION: &str = r#"mutation CreateVersion($modId: ModID!) {
  versionID: createVersion(modId: $modId)
}"#;

/// Uploads one part of the artifact. Sent as a multipart request with the
/// `file` variable filled by form part `"0"`.
pub const UPLOAD_VERSION_PART: &str = r#"mutation UploadVersionPart($modId: ModID!, $versionId: VersionID!, $part: Int!, $file: Upload!) {
  uploadVersionPart(modId: $modId, versionId: $versionId, part: $part, file: $file)
}"#;

/// Closes the upload and attaches the changelog and stability.
pub const FINALIZE_CREATE_VERSION: &str = r#"mutation FinalizeCreateVersion($modId: ModID!, $versionId: VersionID!, $version: NewVersion!) {
  success: finalizeCreateVersion(modId: $modId, versionId: $versionId, version: $version)
}"#;

/// Reports whether the finalized version has been processed yet.
pub const CHECK_VERSION_UPLOAD_STATE: &str = r#"query CheckVersionUploadState($modId: ModID!, $versionId: VersionID!) {
  state: checkVersionUploadState(modId: $modId, versionId: $versionId) {
    auto_approved
    version {
      id
    }
  }
}"#;

/// Map document linking form part `"0"` to the `file` variable.
pub const UPLOAD_FILE_MAP_KEY: &str = "0";

/// Object path of the upload placeholder inside `operations`.
pub const UPLOAD_FILE_VARIABLE_PATH: &str = "variables.file";
