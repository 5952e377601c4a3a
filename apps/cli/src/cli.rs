//! Command line interface definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use modpub_transfer::DEFAULT_CHUNK_SIZE;

/// modpub - publish mod versions to the mod repository
#[derive(Debug, Parser)]
#[command(name = "modpub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Publish mod versions to the mod repository")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
///
/// Unset values fall back to the config file, then to built-in defaults.
#[derive(Debug, Default, Args)]
pub struct GlobalArgs {
    /// The log level to output
    #[arg(long, global = true, env = "FICSIT_LOG", value_name = "LEVEL")]
    pub log: Option<String>,

    /// File to append logs to
    #[arg(long, global = true, env = "FICSIT_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Do not log anything to the console
    #[arg(long, global = true, env = "FICSIT_QUIET")]
    pub quiet: bool,

    /// URL for the API
    #[arg(long, global = true, env = "FICSIT_API_BASE", value_name = "URL")]
    pub api_base: Option<String>,

    /// Path for the GraphQL API
    #[arg(long, global = true, env = "FICSIT_GRAPHQL_API", value_name = "PATH")]
    pub graphql_api: Option<String>,

    /// API key to use when sending requests
    #[arg(long, global = true, env = "FICSIT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds (default: none)
    #[arg(long, global = true, env = "FICSIT_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Use alternate config file
    #[arg(long, global = true, env = "FICSIT_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload a new mod version
    Upload(UploadArgs),

    /// Print the version and exit
    Version,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Mod reference or id
    pub mod_id: String,

    /// Path to the mod archive
    pub file: PathBuf,

    /// Changelog; words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub changelog: Vec<String>,

    /// Size of chunks to split uploaded mod in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_name = "BYTES")]
    pub chunk_size: u64,

    /// Stability of the uploaded mod (alpha, beta, release)
    #[arg(long, default_value = "release")]
    pub stability: String,

    /// Number of chunks uploaded in parallel
    #[arg(long, default_value_t = 1, value_name = "N")]
    pub concurrency: usize,

    /// Stop waiting for the review state after this many seconds
    #[arg(long, value_name = "SECS")]
    pub poll_timeout: Option<u64>,
}

impl UploadArgs {
    pub fn changelog(&self) -> String {
        self.changelog.join(" ")
    }
}
