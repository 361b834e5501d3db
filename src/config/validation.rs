//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: WorkerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::WorkerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("github.api_base '{0}' is not an http(s) URL")]
    ApiBase(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("routes.draft_release and routes.debug_reader must differ")]
    DuplicateRoute,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &WorkerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    match url::Url::parse(&config.github.api_base) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::ApiBase(config.github.api_base.clone())),
    }

    let required = [
        ("github.owner", &config.github.owner),
        ("github.repo", &config.github.repo),
        ("github.user_agent", &config.github.user_agent),
        ("github.token_env", &config.github.token_env),
        ("routes.draft_release", &config.routes.draft_release),
        ("routes.debug_reader", &config.routes.debug_reader),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::Empty(field));
        }
    }

    if !config.routes.draft_release.is_empty()
        && config.routes.draft_release == config.routes.debug_reader
    {
        errors.push(ValidationError::DuplicateRoute);
    }

    if config.debug_reader.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("debug_reader.max_body_bytes"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.github.timeout_secs == 0 {
        errors.push(ValidationError::Zero("github.timeout_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
