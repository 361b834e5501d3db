//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with a single dispatch handler
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Dispatch to the draft release lookup or the debug reader
//! - Serve until shutdown is signalled

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, FromRequest, Multipart, State},
    http::{Method, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::WorkerConfig;
use crate::debug_reader::{DebugSubmission, DebugTrace, DecodeError, DecodeOutcome, DecodePipeline};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::releases::{ReleaseClient, ReleaseResult};
use crate::routing::{Route, RouteMatch, Router as WorkerRouter};

/// The debug reader page, embedded at build time.
pub const DEBUG_READER_HTML: &str = include_str!("../../assets/debug-reader.html");

/// Application state injected into handlers. Immutable and shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<WorkerRouter>,
    pub releases: Arc<ReleaseClient>,
    pub pipeline: Arc<DecodePipeline>,
    pub debug_page: &'static str,
}

/// HTTP server for the worker.
pub struct HttpServer {
    router: Router,
    config: WorkerConfig,
}

impl HttpServer {
    /// Create a new HTTP server.
    ///
    /// A missing credential is tolerated: lookups are still attempted and the
    /// API's rejection is reported to the caller.
    pub fn new(config: WorkerConfig, credential: Option<String>) -> ReleaseResult<Self> {
        let token = credential.unwrap_or_else(|| {
            tracing::warn!(
                env_var = %config.github.token_env,
                "No release API credential configured; draft lookups will be rejected"
            );
            String::new()
        });

        let state = AppState {
            router: Arc::new(WorkerRouter::from_config(&config.routes)),
            releases: Arc::new(ReleaseClient::new(&config.github, token)?),
            pipeline: Arc::new(DecodePipeline::new(config.debug_reader.preview_chars)),
            debug_page: DEBUG_READER_HTML,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &WorkerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.debug_reader.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown receiver fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            draft_route = %self.config.routes.draft_release,
            debug_route = %self.config.routes.debug_reader,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }
}

/// Single entry point: route, run the handler, record metrics.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let matched = state.router.match_request(&request);

    tracing::debug!(
        method = %request.method(),
        route = matched.name(),
        "Dispatching request"
    );

    let response = match matched {
        RouteMatch::MethodNotAllowed => response::method_not_allowed(),
        RouteMatch::NotFound => {
            tracing::debug!(path = %request.uri().path(), "No route matched");
            response::not_found()
        }
        RouteMatch::Matched(Route::DraftRelease) => draft_release(&state).await,
        RouteMatch::Matched(Route::DebugReader) => debug_reader(&state, request).await,
    };

    metrics::record_request(matched.name(), response.status().as_u16(), start_time);
    response
}

async fn draft_release(state: &AppState) -> Response {
    match state.releases.latest_draft_url().await {
        Ok(url) => response::redirect(&url),
        Err(e) => e.into_response(),
    }
}

async fn debug_reader(state: &AppState, request: Request<Body>) -> Response {
    if request.method() == Method::GET {
        return response::debug_page(state.debug_page);
    }

    let submission = match Multipart::from_request(request, state).await {
        Ok(multipart) => DebugSubmission::from_multipart(multipart).await,
        Err(rejection) => {
            let error = DecodeError::Multipart(rejection.to_string());
            tracing::warn!(error = %error, "Rejected debug reader submission");
            return DecodeOutcome::failed(error, DebugTrace::new()).into_response();
        }
    };

    match submission {
        Ok(submission) => state.pipeline.run(&submission).into_response(),
        Err(e) => {
            let error = DecodeError::Multipart(e.to_string());
            tracing::warn!(error = %error, "Failed to read debug reader form");
            DecodeOutcome::failed(error, DebugTrace::new()).into_response()
        }
    }
}
