//! CLI configuration.
//!
//! Settings come from, in order of precedence: command line flags, the
//! matching `FICSIT_*` environment variables (both handled by clap), a
//! TOML config file, and built-in defaults.
//!
//! The config file is `config.toml` in the working directory unless
//! `--config` names another one. Keys match the long flag names:
//!
//! ```toml
//! api-base = "https://api.ficsit.app"
//! api-key = "..."
//! log = "debug"
//! timeout = 120
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use modpub_api::ApiConfig;
use serde::Deserialize;

use crate::cli::GlobalArgs;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub log: Option<String>,
    pub log_file: Option<PathBuf>,
    pub quiet: Option<bool>,
    pub api_base: Option<String>,
    pub graphql_api: Option<String>,
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout: Option<u64>,
}

impl FileConfig {
    /// Loads the config file.
    ///
    /// An explicitly named file must exist. The default file is skipped
    /// when absent.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Effective settings after merging flags, environment and config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log: String,
    pub log_file: Option<PathBuf>,
    pub quiet: bool,
    pub api: ApiConfig,
}

impl Config {
    pub fn resolve(args: &GlobalArgs, file: FileConfig) -> Self {
        let defaults = ApiConfig::default();
        Self {
            log: args
                .log
                .clone()
                .or(file.log)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.into()),
            log_file: args.log_file.clone().or(file.log_file),
            quiet: args.quiet || file.quiet.unwrap_or(false),
            api: ApiConfig {
                api_base: args
                    .api_base
                    .clone()
                    .or(file.api_base)
                    .unwrap_or(defaults.api_base),
                graphql_path: args
                    .graphql_api
                    .clone()
                    .or(file.graphql_api)
                    .unwrap_or(defaults.graphql_path),
                api_key: args.api_key.clone().or(file.api_key).unwrap_or_default(),
                request_timeout: args.timeout.or(file.timeout).map(Duration::from_secs),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags_or_file() {
        let config = Config::resolve(&GlobalArgs::default(), FileConfig::default());
        assert_eq!(config.log, "info");
        assert_eq!(config.log_file, None);
        assert!(!config.quiet);
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.api.endpoint(), "https://api.ficsit.app/v2/query");
    }

    #[test]
    fn file_overrides_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            api-base = "http://localhost:8080"
            graphql-api = "/v2/query"
            api-key = "secret"
            log = "debug"
            quiet = true
            "#,
        )
        .unwrap();

        let config = Config::resolve(&GlobalArgs::default(), file);
        assert_eq!(config.api.api_base, "http://localhost:8080");
        assert_eq!(config.api.api_key, "secret");
        assert_eq!(config.log, "debug");
        assert!(config.quiet);
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig {
            api_base: Some("http://from-file".into()),
            api_key: Some("file-key".into()),
            log: Some("warn".into()),
            ..FileConfig::default()
        };
        let args = GlobalArgs {
            api_base: Some("http://from-flag".into()),
            log: Some("trace".into()),
            ..GlobalArgs::default()
        };

        let config = Config::resolve(&args, file);
        assert_eq!(config.api.api_base, "http://from-flag");
        assert_eq!(config.api.api_key, "file-key");
        assert_eq!(config.log, "trace");
    }

    #[test]
    fn request_timeout_from_file_or_flag() {
        let file: FileConfig = toml::from_str("timeout = 120").unwrap();
        let config = Config::resolve(&GlobalArgs::default(), file.clone());
        assert_eq!(config.api.request_timeout, Some(Duration::from_secs(120)));

        let args = GlobalArgs {
            timeout: Some(15),
            ..GlobalArgs::default()
        };
        let config = Config::resolve(&args, file);
        assert_eq!(config.api.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<FileConfig, _> = toml::from_str(r#"api_key = "underscore""#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = FileConfig::load(Some(&tmp.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn load_explicit_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("modpub.toml");
        std::fs::write(&path, "log-file = \"modpub.log\"\n").unwrap();

        let file = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(file.log_file, Some(PathBuf::from("modpub.log")));
        assert_eq!(file.api_base, None);
    }
}
