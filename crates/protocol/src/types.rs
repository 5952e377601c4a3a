use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Release channel of a published version.
///
/// Parsed from the lowercase names accepted on the command line and sent
/// to the API as the `VersionStabilities` enum (`ALPHA`, `BETA`, `RELEASE`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stability {
    Alpha,
    Beta,
    #[default]
    Release,
}

impl Stability {
    /// Lowercase name as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stability name is not one of `alpha`, `beta`, `release`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version stability: {0}")]
pub struct ParseStabilityError(pub String);

impl FromStr for Stability {
    type Err = ParseStabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alpha" => Ok(Self::Alpha),
            "beta" => Ok(Self::Beta),
            "release" => Ok(Self::Release),
            other => Err(ParseStabilityError(other.to_string())),
        }
    }
}

/// Input object of the finalize mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVersion {
    pub changelog: String,
    pub stability: Stability,
}

/// Snapshot of the server-side review state of an uploaded version.
///
/// `has_version` stays false until the server has processed the upload;
/// `auto_approved` is only meaningful once it is true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionReviewState {
    pub version_id: String,
    pub has_version: bool,
    pub auto_approved: bool,
}

impl VersionReviewState {
    /// State reported while the server has no version record yet.
    pub fn pending() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stability_parses_cli_names() {
        assert_eq!("alpha".parse::<Stability>().unwrap(), Stability::Alpha);
        assert_eq!("beta".parse::<Stability>().unwrap(), Stability::Beta);
        assert_eq!("release".parse::<Stability>().unwrap(), Stability::Release);
    }

    #[test]
    fn stability_rejects_unknown_names() {
        let err = "nightly".parse::<Stability>().unwrap_err();
        assert_eq!(err, ParseStabilityError("nightly".into()));
        assert_eq!(err.to_string(), "invalid version stability: nightly");

        // Matching is case sensitive, like the flag it comes from.
        assert!("Release".parse::<Stability>().is_err());
        assert!("".parse::<Stability>().is_err());
    }

    #[test]
    fn stability_wire_format_is_uppercase() {
        assert_eq!(serde_json::to_string(&Stability::Alpha).unwrap(), r#""ALPHA""#);
        assert_eq!(serde_json::to_string(&Stability::Release).unwrap(), r#""RELEASE""#);
        let parsed: Stability = serde_json::from_str(r#""BETA""#).unwrap();
        assert_eq!(parsed, Stability::Beta);
    }

    #[test]
    fn stability_defaults_to_release() {
        assert_eq!(Stability::default(), Stability::Release);
        assert_eq!(Stability::default().to_string(), "release");
    }

    #[test]
    fn new_version_serializes_input_object() {
        let v = NewVersion {
            changelog: "Fixed crash on load".into(),
            stability: Stability::Beta,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "changelog": "Fixed crash on load", "stability": "BETA" })
        );
    }
}
