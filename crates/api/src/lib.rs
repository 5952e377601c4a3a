//! Client for the mod repository GraphQL API.
//!
//! Two request shapes go through the same endpoint: plain JSON GraphQL
//! requests ([`Client::execute`] and the typed helpers built on it) and
//! pre-framed multipart bodies for file parts ([`Client::send_multipart`]).

pub mod client;
pub mod config;

pub use client::{Client, Error, RawResponse};
pub use config::ApiConfig;
