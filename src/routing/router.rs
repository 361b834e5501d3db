//! Route lookup and dispatch.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Explicit NotFound / MethodNotAllowed rather than a silent default

use axum::body::Body;
use axum::http::{Method, Request};

use crate::config::RoutesConfig;
use crate::routing::matcher::{Matcher, MethodMatcher, PathContainsMatcher};

/// Handlers the worker can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Redirect to the latest draft release.
    DraftRelease,
    /// Static page on GET, blob decoding on POST.
    DebugReader,
}

impl Route {
    /// Label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Route::DraftRelease => "draft_release",
            Route::DebugReader => "debug_reader",
        }
    }
}

/// Result of routing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch {
    Matched(Route),
    MethodNotAllowed,
    NotFound,
}

impl RouteMatch {
    pub fn name(&self) -> &'static str {
        match self {
            RouteMatch::Matched(route) => route.name(),
            RouteMatch::MethodNotAllowed => "method_not_allowed",
            RouteMatch::NotFound => "none",
        }
    }
}

/// Maps method + path to a route.
#[derive(Debug)]
pub struct Router {
    methods: MethodMatcher,
    routes: Vec<(Route, Box<dyn Matcher>)>,
}

impl Router {
    /// Build the fixed route table from configuration.
    pub fn from_config(config: &RoutesConfig) -> Self {
        let routes: Vec<(Route, Box<dyn Matcher>)> = vec![
            (
                Route::DraftRelease,
                Box::new(PathContainsMatcher::new(config.draft_release.clone())),
            ),
            (
                Route::DebugReader,
                Box::new(PathContainsMatcher::new(config.debug_reader.clone())),
            ),
        ];

        Self {
            methods: MethodMatcher::new([Method::GET, Method::POST]),
            routes,
        }
    }

    /// Find the route for a request.
    pub fn match_request(&self, req: &Request<Body>) -> RouteMatch {
        if !self.methods.matches(req) {
            return RouteMatch::MethodNotAllowed;
        }

        self.routes
            .iter()
            .find(|(_, matcher)| matcher.matches(req))
            .map(|(route, _)| RouteMatch::Matched(*route))
            .unwrap_or(RouteMatch::NotFound)
    }
}
