//! Route matching logic.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - The query string is never inspected

use axum::body::Body;
use axum::http::{Method, Request};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches when the request path contains a fragment anywhere.
#[derive(Debug, Clone)]
pub struct PathContainsMatcher {
    fragment: String,
}

impl PathContainsMatcher {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }
}

impl Matcher for PathContainsMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().contains(&self.fragment)
    }
}

/// Matches requests whose method is in an allow-list.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    allowed: Vec<Method>,
}

impl MethodMatcher {
    pub fn new(allowed: impl IntoIterator<Item = Method>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.allowed.contains(req.method())
    }
}
