//! Debug blob decoding subsystem.
//!
//! # Data Flow
//! ```text
//! multipart submission (fileInput | textInput)
//!     → input.rs (pick the content, log its origin)
//!     → extract.rs (marker extraction, base64 sanitization)
//!     → base64 decode
//!     → decompress.rs (ordered strategy chain: streaming brotli,
//!                      buffered brotli, raw bytes)
//!     → extract.rs (escaped preview)
//!     → JSON parse
//!     → DecodeOutcome (Parsed value | Failed message + trace)
//! ```
//!
//! # Design Decisions
//! - Every stage boundary appends to a per-request `DebugTrace`
//! - The decompression fallback chain is data, not nested control flow
//! - Failures are caught at the pipeline boundary and never escape as panics

pub mod decompress;
pub mod extract;
pub mod input;
pub mod pipeline;
pub mod trace;

pub use decompress::{DecodeStrategy, DecompressionChain};
pub use input::{DebugSubmission, UploadedFile};
pub use pipeline::{DecodeError, DecodeOutcome, DecodePipeline};
pub use trace::{DebugTrace, TraceEntry};
