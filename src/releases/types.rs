//! Release payloads and lookup errors.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// The fields of a release object this worker relies on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Kept untyped: only a literal `true` marks a draft.
    #[serde(default)]
    pub draft: Option<Value>,
    pub html_url: String,
}

impl Release {
    pub fn is_draft(&self) -> bool {
        matches!(self.draft, Some(Value::Bool(true)))
    }
}

/// Errors that can occur while resolving the latest draft release.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The API refused the request, usually because the token is invalid or expired.
    #[error("Broken GitHub PAT")]
    BrokenCredential { status: u16, details: String },

    #[error("No GitHub Releases")]
    NoReleases,

    #[error("Latest GitHub Release is not a draft, one needs made")]
    NotDraft,

    /// The request never completed or the body was not a release list.
    #[error("GitHub request failed")]
    Upstream(#[from] reqwest::Error),
}

impl ReleaseError {
    /// Extra context surfaced to the caller next to the message.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::BrokenCredential { details, .. } => Some(details.clone()),
            Self::Upstream(e) => Some(e.to_string()),
            Self::NoReleases | Self::NotDraft => None,
        }
    }

    /// Whether the problem lies with the repository or credential rather than the network.
    pub fn is_client_facing(&self) -> bool {
        !matches!(self, Self::Upstream(_))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BrokenCredential { .. } => "broken_credential",
            Self::NoReleases => "no_releases",
            Self::NotDraft => "not_draft",
            Self::Upstream(_) => "upstream",
        }
    }
}

/// Result alias for release operations.
pub type ReleaseResult<T> = Result<T, ReleaseError>;
