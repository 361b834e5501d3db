//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (method allow-list, route lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: Matched(Route) | MethodNotAllowed | NotFound
//! ```
//!
//! # Design Decisions
//! - Routes built once at startup, immutable at runtime
//! - Substring containment on the raw path, no segment parsing
//! - Method check happens before any path matching
//! - First match wins, in declaration order

pub mod matcher;
pub mod router;

pub use router::{Route, RouteMatch, Router};
