//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the worker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WorkerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Release-hosting API settings.
    pub github: GitHubConfig,

    /// Path fragments that select each handler.
    pub routes: RoutesConfig,

    /// Debug reader limits.
    pub debug_reader: DebugReaderConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Release-hosting API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API root, without trailing slash.
    pub api_base: String,

    /// Repository owner.
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// User-Agent sent with every API call.
    pub user_agent: String,

    /// Value of the `X-GitHub-Api-Version` header.
    pub api_version: String,

    /// Name of the environment variable holding the bearer credential.
    pub token_env: String,

    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,
}

impl GitHubConfig {
    /// URL of the "list releases" endpoint for the configured repository.
    pub fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            owner: "PunishXIV".to_string(),
            repo: "WrathCombo".to_string(),
            user_agent: "WrathComboLink-Worker".to_string(),
            api_version: "2022-11-28".to_string(),
            token_env: "DRAFT_RELEASE_KEY".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Substrings of the request path that select a handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Redirects to the latest draft release.
    pub draft_release: String,

    /// Serves the debug reader page (GET) and decodes submissions (POST).
    pub debug_reader: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            draft_release: "/patchnotes-draft".to_string(),
            debug_reader: "/debug-reader".to_string(),
        }
    }
}

/// Debug reader configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DebugReaderConfig {
    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Number of characters of decoded text logged before parsing.
    pub preview_chars: usize,
}

impl Default for DebugReaderConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            preview_chars: 100,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address of the scrape endpoint.
    pub metrics_address: String,

    /// Filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            log_filter: "combolink_worker=debug,tower_http=debug".to_string(),
        }
    }
}
