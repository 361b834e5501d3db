//! Edge worker: draft release redirects and a debug code reader.

pub mod config;
pub mod debug_reader;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod releases;
pub mod routing;

pub use config::WorkerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
