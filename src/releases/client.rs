//! HTTP client for the "list releases" endpoint.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};
use std::time::Duration;

use crate::config::GitHubConfig;
use crate::observability::metrics;
use crate::releases::types::{Release, ReleaseError, ReleaseResult};

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";

/// Client for resolving the newest draft release of one repository.
#[derive(Clone)]
pub struct ReleaseClient {
    http: reqwest::Client,
    releases_url: String,
    token: String,
}

impl std::fmt::Debug for ReleaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseClient")
            .field("releases_url", &self.releases_url)
            .finish_non_exhaustive()
    }
}

impl ReleaseClient {
    /// Create a client for the configured repository.
    ///
    /// # Arguments
    /// * `config` - API location, repository and header values
    /// * `token` - Bearer credential; may be empty, in which case the API rejects the call
    pub fn new(config: &GitHubConfig, token: impl Into<String>) -> ReleaseResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        if let Ok(version) = HeaderValue::from_str(&config.api_version) {
            headers.insert(API_VERSION_HEADER, version);
        } else {
            tracing::warn!(api_version = %config.api_version, "Ignoring invalid API version header");
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            releases_url: config.releases_url(),
            token: token.into(),
        })
    }

    /// Web URL of the most recent release, provided it is still a draft.
    pub async fn latest_draft_url(&self) -> ReleaseResult<String> {
        let result = self.fetch_latest_draft().await;
        match &result {
            Ok(url) => {
                tracing::info!(url = %url, "Resolved latest draft release");
                metrics::record_release_lookup("redirect");
            }
            Err(e) => {
                tracing::warn!(error = %e, details = ?e.details(), "Draft release lookup failed");
                metrics::record_release_lookup(e.kind());
            }
        }
        result
    }

    async fn fetch_latest_draft(&self) -> ReleaseResult<String> {
        let response = self
            .http
            .get(&self.releases_url)
            .query(&[("per_page", "1"), ("page", "1")])
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let details = failure_details(response.text().await);
            return Err(ReleaseError::BrokenCredential {
                status: status.as_u16(),
                details,
            });
        }

        let releases: Vec<Release> = response.json().await?;
        let latest = releases.into_iter().next().ok_or(ReleaseError::NoReleases)?;
        if !latest.is_draft() {
            return Err(ReleaseError::NotDraft);
        }

        Ok(latest.html_url)
    }
}

/// Body text of a rejected request, or why it could not be read.
fn failure_details(body: reqwest::Result<String>) -> String {
    body.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read release API error body");
        format!("could not read response body: {e}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RELEASES_PATH: &str = "/repos/PunishXIV/WrathCombo/releases";

    async fn client_for(server: &MockServer) -> ReleaseClient {
        let config = GitHubConfig {
            api_base: server.uri(),
            ..GitHubConfig::default()
        };
        ReleaseClient::new(&config, "test-token").unwrap()
    }

    #[tokio::test]
    async fn test_draft_release_resolves() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RELEASES_PATH))
            .and(query_param("per_page", "1"))
            .and(query_param("page", "1"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("accept", GITHUB_JSON))
            .and(header("x-github-api-version", "2022-11-28"))
            .and(header("user-agent", "WrathComboLink-Worker"))
            .and(header("cache-control", "no-store"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"draft": true, "html_url": "https://github.com/PunishXIV/WrathCombo/releases/tag/untagged-1"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let url = client_for(&server).await.latest_draft_url().await.unwrap();
        assert_eq!(url, "https://github.com/PunishXIV/WrathCombo/releases/tag/untagged-1");
    }

    #[tokio::test]
    async fn test_published_release_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RELEASES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"draft": false, "html_url": "https://example.com/published"}
            ])))
            .mount(&server)
            .await;

        let err = client_for(&server).await.latest_draft_url().await.unwrap_err();
        assert!(matches!(err, ReleaseError::NotDraft));
    }

    #[tokio::test]
    async fn test_empty_release_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RELEASES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let err = client_for(&server).await.latest_draft_url().await.unwrap_err();
        assert!(matches!(err, ReleaseError::NoReleases));
    }

    #[tokio::test]
    async fn test_unauthorized_keeps_upstream_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RELEASES_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"Bad credentials"}"#))
            .mount(&server)
            .await;

        let err = client_for(&server).await.latest_draft_url().await.unwrap_err();
        match err {
            ReleaseError::BrokenCredential { status, details } => {
                assert_eq!(status, 401);
                assert_eq!(details, r#"{"message":"Bad credentials"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RELEASES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.latest_draft_url().await.unwrap_err();
        assert!(matches!(err, ReleaseError::Upstream(_)));
        assert!(!err.is_client_facing());
    }

    #[tokio::test]
    async fn test_unreadable_error_body_is_reported() {
        let err = reqwest::Client::new().get("not a url").send().await.unwrap_err();
        let details = failure_details(Err(err));
        assert!(details.starts_with("could not read response body: "), "{details}");

        assert_eq!(failure_details(Ok("Bad credentials".to_string())), "Bad credentials");
    }

    #[tokio::test]
    async fn test_null_draft_flag_is_not_draft() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RELEASES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"draft": null, "html_url": "https://example.com/unknown"}
            ])))
            .mount(&server)
            .await;

        let err = client_for(&server).await.latest_draft_url().await.unwrap_err();
        assert!(matches!(err, ReleaseError::NotDraft));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = ReleaseClient::new(&GitHubConfig::default(), "secret-value").unwrap();
        assert!(!format!("{client:?}").contains("secret-value"));
    }
}
