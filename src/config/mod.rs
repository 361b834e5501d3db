//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → WorkerConfig (validated, immutable)
//!     → shared via Arc to the HTTP server
//!
//! environment
//!     → loader.rs (bearer credential for the release API)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so the worker runs without a file
//! - Validation separates syntactic (serde) from semantic checks
//! - The credential never lives in the file, only in the environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_credential, ConfigError};
pub use schema::{
    DebugReaderConfig, GitHubConfig, ListenerConfig, ObservabilityConfig, RoutesConfig,
    TimeoutConfig, WorkerConfig,
};
