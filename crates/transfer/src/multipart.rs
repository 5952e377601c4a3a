//! GraphQL multipart request framing.
//!
//! Each upload part is sent as a `multipart/form-data` body with three
//! fields, in order:
//!
//! 1. `operations`: the mutation and its variables, with `file: null`
//! 2. `map`: `{"0": ["variables.file"]}`
//! 3. `0`: the raw chunk bytes
//!
//! The server substitutes form part `0` into `variables.file`.

use std::collections::BTreeMap;
use std::io::Write;

use modpub_protocol::constants::{
    UPLOAD_FILE_MAP_KEY, UPLOAD_FILE_VARIABLE_PATH, UPLOAD_VERSION_PART,
};
use modpub_protocol::messages::{GraphqlRequest, UploadVersionPartVariables};

use crate::TransferError;

/// Content type of the file part.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A fully framed request body for one upload part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartEnvelope {
    /// Part number carried in the `operations` variables.
    pub part_number: u32,
    /// Complete `multipart/form-data` body.
    pub body: Vec<u8>,
    /// Value for the `Content-Type` request header.
    pub content_type: String,
}

/// Frames upload parts under a single boundary.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    boundary: String,
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeBuilder {
    /// Creates a builder with a random boundary.
    pub fn new() -> Self {
        Self {
            boundary: format!("modpub-{}", uuid::Uuid::new_v4().simple()),
        }
    }

    /// Creates a builder with a fixed boundary.
    ///
    /// The boundary must not occur inside any chunk; random boundaries from
    /// [`new`](Self::new) make that practically certain.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `multipart/form-data; boundary=...`
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Builds the request body for one part.
    ///
    /// Only `chunk` is copied into the body; the caller decides how much of
    /// the artifact is held in memory.
    pub fn build(
        &self,
        mod_id: &str,
        version_id: &str,
        part_number: u32,
        chunk: &[u8],
        file_name: &str,
    ) -> Result<MultipartEnvelope, TransferError> {
        let operations = serde_json::to_vec(&GraphqlRequest::new(
            UPLOAD_VERSION_PART,
            UploadVersionPartVariables {
                mod_id: mod_id.to_string(),
                version_id: version_id.to_string(),
                part: part_number,
                file: None,
            },
        ))?;

        let map: BTreeMap<&str, [&str; 1]> =
            BTreeMap::from([(UPLOAD_FILE_MAP_KEY, [UPLOAD_FILE_VARIABLE_PATH])]);
        let map = serde_json::to_vec(&map)?;

        let mut body = Vec::with_capacity(chunk.len() + operations.len() + map.len() + 512);
        self.write_field(&mut body, "operations", &operations)?;
        self.write_field(&mut body, "map", &map)?;
        self.write_file(&mut body, UPLOAD_FILE_MAP_KEY, file_name, chunk)?;
        write!(body, "--{}--\r\n", self.boundary)?;

        Ok(MultipartEnvelope {
            part_number,
            body,
            content_type: self.content_type(),
        })
    }

    fn write_field(&self, body: &mut Vec<u8>, name: &str, value: &[u8]) -> std::io::Result<()> {
        write!(
            body,
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
            self.boundary,
            escape_quotes(name)
        )?;
        body.extend_from_slice(value);
        body.extend_from_slice(b"\r\n");
        Ok(())
    }

    fn write_file(
        &self,
        body: &mut Vec<u8>,
        name: &str,
        file_name: &str,
        data: &[u8],
    ) -> std::io::Result<()> {
        write!(
            body,
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            self.boundary,
            escape_quotes(name),
            escape_quotes(file_name),
            OCTET_STREAM
        )?;
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
        Ok(())
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
