//! Response formatting.
//!
//! # Responsibilities
//! - Map handler outcomes to status codes and content types
//! - Serialize every JSON body through serde, never by string building
//!
//! | Outcome                    | Status | Body                               |
//! |----------------------------|--------|------------------------------------|
//! | Draft release found        | 302    | none (Location header)             |
//! | Release lookup error       | 400    | `{error, errorDetails}`            |
//! | Release API unreachable    | 502    | `{error, errorDetails}`            |
//! | Debug code parsed          | 200    | parsed JSON, pretty-printed        |
//! | Debug code failed          | 400    | `{error, details, debugLog}`       |
//! | Debug reader page          | 200    | HTML                               |
//! | Unknown route              | 404    | none                               |
//! | Method not GET/POST        | 405    | none                               |

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::debug_reader::{DebugTrace, DecodeOutcome};
use crate::releases::ReleaseError;

/// Top-level message of every decode failure body.
pub const DECODE_FAILURE: &str = "Failed to process debug code";

const PARSED_INDENT: &[u8] = b"        ";
const ERROR_INDENT: &[u8] = b"  ";

#[derive(Debug, Serialize)]
struct ReleaseErrorBody {
    error: String,
    #[serde(rename = "errorDetails", skip_serializing_if = "Option::is_none")]
    error_details: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecodeFailureBody<'a> {
    error: &'static str,
    details: &'a str,
    debug_log: &'a DebugTrace,
}

/// Serialize `value` as indented JSON with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, value: &T, indent: &[u8]) -> Response {
    let mut body = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(indent));

    match value.serialize(&mut serializer) {
        Ok(()) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// 302 to the given URL.
pub fn redirect(url: &str) -> Response {
    match HeaderValue::from_str(url) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(_) => {
            tracing::error!(url = %url, "Release URL is not a valid Location header");
            json_response(
                StatusCode::BAD_GATEWAY,
                &ReleaseErrorBody {
                    error: "Invalid release URL".to_string(),
                    error_details: Some(url.to_string()),
                },
                ERROR_INDENT,
            )
        }
    }
}

/// The static debug reader page.
pub fn debug_page(html: &'static str) -> Response {
    Html(html).into_response()
}

pub fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

pub fn method_not_allowed() -> Response {
    StatusCode::METHOD_NOT_ALLOWED.into_response()
}

impl IntoResponse for ReleaseError {
    fn into_response(self) -> Response {
        let status = if self.is_client_facing() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::BAD_GATEWAY
        };
        let body = ReleaseErrorBody {
            error: self.to_string(),
            error_details: self.details(),
        };
        json_response(status, &body, ERROR_INDENT)
    }
}

impl IntoResponse for DecodeOutcome {
    fn into_response(self) -> Response {
        match self {
            DecodeOutcome::Parsed(value) => json_response(StatusCode::OK, &value, PARSED_INDENT),
            DecodeOutcome::Failed { message, trace } => json_response(
                StatusCode::BAD_REQUEST,
                &DecodeFailureBody {
                    error: DECODE_FAILURE,
                    details: &message,
                    debug_log: &trace,
                },
                ERROR_INDENT,
            ),
        }
    }
}
