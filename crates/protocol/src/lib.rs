//! Wire protocol for publishing mod versions through the GraphQL API.
//!
//! Holds the operation documents, their variables and response payloads,
//! and the small set of domain types shared by the transport and the
//! publishing pipeline.

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use messages::{GraphqlError, GraphqlRequest, GraphqlResponse};
pub use types::{NewVersion, ParseStabilityError, Stability, VersionReviewState};
