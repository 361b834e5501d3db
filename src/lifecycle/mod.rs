//! Process lifecycle management.
//!
//! # Data Flow
//! ```text
//! OS signal (SIGINT / SIGTERM)
//!     → signals.rs (translate to shutdown)
//!     → shutdown.rs (broadcast to subscribers)
//!     → HTTP server stops accepting, drains in-flight requests
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
