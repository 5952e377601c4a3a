//! Mod version publish flow.
//!
//! This crate implements the **business logic** for publishing a new
//! version of a mod. It has no HTTP dependency of its own beyond the
//! [`ModRegistry`] implementation for [`modpub_api::Client`]; tests drive
//! the orchestrator through in-memory registries.
//!
//! # Pipeline
//!
//! 1. **Init**: validate chunk size, stability and the artifact
//! 2. **Create**: obtain a version id from the registry
//! 3. **Upload**: send every planned chunk as a multipart request
//! 4. **Finalize**: attach changelog and stability
//! 5. **Poll**: wait until the registry reports the review outcome

pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod session;
pub mod types;

// Re-export primary types for convenience.
pub use error::PublishError;
pub use orchestrator::PublishOrchestrator;
pub use registry::{ModRegistry, RegistryError, RegistryFuture};
pub use session::{UploadSession, UploadTarget};
pub use types::{
    Phase, PublishEvent, PublishReport, PublishRequest, PublishSettings, ReviewOutcome,
};
