//! Draft release lookup against the release-hosting API.
//!
//! # Data Flow
//! ```text
//! bearer credential (environment, read once at startup)
//!     → client.rs (single GET, one release per page, no caching)
//!     → types.rs (status / emptiness / draft checks)
//!     → Ok(html_url) | Err(ReleaseError)
//! ```
//!
//! # Constraints
//! - Never log the credential
//! - Single-shot: no retries, no backoff

pub mod client;
pub mod types;

pub use client::ReleaseClient;
pub use types::{Release, ReleaseError, ReleaseResult};
