//! Ordered decompression strategies.
//!
//! Payloads come from clients of different ages: most are Brotli compressed,
//! older ones carry plain JSON. The chain tries each strategy in order, stops
//! at the first success and records every attempt in the trace.

use brotli_decompressor::{BrotliDecompressStream, BrotliResult, BrotliState, StandardAlloc};
use thiserror::Error;

use crate::debug_reader::extract::decode_utf8;
use crate::debug_reader::trace::DebugTrace;
use crate::observability::metrics;

/// Why a single strategy could not produce output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("corrupt brotli stream")]
    Corrupt,

    #[error("brotli stream ended before its final block")]
    Truncated,

    #[error("unconsumed data after the end of the brotli stream")]
    TrailingData,

    #[error("{0}")]
    Other(String),
}

/// Every strategy in the chain failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("all {attempts} decompression strategies failed")]
pub struct ChainExhausted {
    pub attempts: usize,
}

/// A named way of turning decoded base64 bytes into text bytes.
pub trait DecodeStrategy: Send + Sync + std::fmt::Debug {
    /// Stable identifier, used as a metrics label.
    fn name(&self) -> &'static str;

    /// Human label used in trace messages.
    fn label(&self) -> &'static str;

    /// Trace step under which this strategy reports.
    fn step(&self) -> &'static str {
        "Decompression"
    }

    fn attempt_message(&self) -> Option<String> {
        Some(format!("Attempting {}...", self.label()))
    }

    fn success_message(&self, chars: usize) -> String {
        format!("{} success. Result string length: {}", self.label(), chars)
    }

    fn failure_message(&self, error: &StrategyError) -> String {
        format!("{} failed: {}", self.label(), error)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, StrategyError>;
}

/// Incremental Brotli decoding through fixed-size input and output windows.
#[derive(Debug, Clone)]
pub struct StreamingBrotli {
    pub input_window: usize,
    pub output_window: usize,
}

impl Default for StreamingBrotli {
    fn default() -> Self {
        Self {
            input_window: 1024,
            output_window: 4096,
        }
    }
}

impl DecodeStrategy for StreamingBrotli {
    fn name(&self) -> &'static str {
        "native_brotli"
    }

    fn label(&self) -> &'static str {
        "Native Brotli"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, StrategyError> {
        brotli_exact(bytes, self.input_window, self.output_window)
    }
}

/// Whole-buffer Brotli decoding, used when streaming fails.
///
/// Runs the same decoder as [`StreamingBrotli`] with different buffer sizes, so
/// in practice it only fails after streaming has failed. It stays in the chain
/// to keep the two-tier trace clients are used to, and as the slot for a
/// second codec.
#[derive(Debug, Clone, Default)]
pub struct BufferedBrotli;

impl DecodeStrategy for BufferedBrotli {
    fn name(&self) -> &'static str {
        "fallback_brotli"
    }

    fn label(&self) -> &'static str {
        "Fallback library"
    }

    fn attempt_message(&self) -> Option<String> {
        Some("Attempting fallback with packaged brotli...".to_string())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, StrategyError> {
        let output_window = bytes.len().saturating_mul(4).max(4096);
        brotli_exact(bytes, bytes.len().max(1), output_window)
    }
}

/// Legacy uncompressed payloads. Always succeeds; if the data was in fact
/// compressed the text is garbage and the JSON stage reports it.
#[derive(Debug, Clone, Default)]
pub struct RawBytes;

impl DecodeStrategy for RawBytes {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn label(&self) -> &'static str {
        "Raw bytes"
    }

    fn step(&self) -> &'static str {
        "Fallback"
    }

    fn attempt_message(&self) -> Option<String> {
        None
    }

    fn success_message(&self, chars: usize) -> String {
        format!("Decoded raw bytes to string. String length: {}", chars)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, StrategyError> {
        Ok(bytes.to_vec())
    }
}

/// Text produced by the first successful strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    pub text: String,
    pub strategy: &'static str,
}

/// Ordered list of strategies; first success wins.
#[derive(Debug)]
pub struct DecompressionChain {
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl DecompressionChain {
    pub fn new(strategies: Vec<Box<dyn DecodeStrategy>>) -> Self {
        Self { strategies }
    }

    /// Streaming Brotli, then buffered Brotli, then the raw bytes.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(StreamingBrotli::default()),
            Box::new(BufferedBrotli),
            Box::new(RawBytes),
        ])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the strategies in order. Invalid UTF-8 is replaced, never rejected, and a
    /// leading byte order mark is dropped.
    pub fn run(&self, bytes: &[u8], trace: &mut DebugTrace) -> Result<Decompressed, ChainExhausted> {
        for strategy in &self.strategies {
            if let Some(message) = strategy.attempt_message() {
                trace.record(strategy.step(), message);
            }

            match strategy.decode(bytes) {
                Ok(output) => {
                    let text = decode_utf8(&output);
                    trace.record(strategy.step(), strategy.success_message(text.chars().count()));
                    metrics::record_decode_strategy(strategy.name(), "success");
                    return Ok(Decompressed {
                        text,
                        strategy: strategy.name(),
                    });
                }
                Err(e) => {
                    tracing::debug!(strategy = strategy.name(), error = %e, "Decode strategy failed");
                    trace.record(strategy.step(), strategy.failure_message(&e));
                    metrics::record_decode_strategy(strategy.name(), "failure");
                }
            }
        }

        Err(ChainExhausted {
            attempts: self.strategies.len(),
        })
    }
}

impl Default for DecompressionChain {
    fn default() -> Self {
        Self::standard()
    }
}

/// Decode a complete Brotli stream, requiring it to end exactly at the end of `input`.
///
/// Short plain-text inputs can parse as a tiny complete Brotli stream; leftover
/// input after the final block means the bytes were not Brotli at all.
fn brotli_exact(
    input: &[u8],
    input_window: usize,
    output_window: usize,
) -> Result<Vec<u8>, StrategyError> {
    let input_window = input_window.max(1);
    let mut out_buf = vec![0u8; output_window.max(1)];
    let mut output = Vec::new();
    let mut state = BrotliState::new(
        StandardAlloc::default(),
        StandardAlloc::default(),
        StandardAlloc::default(),
    );

    let mut pos = 0usize;
    let mut window_end = input_window.min(input.len());
    let mut available_in = window_end - pos;
    let mut input_offset = 0usize;
    let mut total_out = 0usize;

    loop {
        let mut available_out = out_buf.len();
        let mut output_offset = 0usize;
        let result = BrotliDecompressStream(
            &mut available_in,
            &mut input_offset,
            &input[pos..window_end],
            &mut available_out,
            &mut output_offset,
            out_buf.as_mut_slice(),
            &mut total_out,
            &mut state,
        );
        output.extend_from_slice(&out_buf[..output_offset]);

        match result {
            BrotliResult::NeedsMoreOutput => {}
            BrotliResult::NeedsMoreInput => {
                pos += input_offset;
                if pos >= input.len() {
                    return Err(StrategyError::Truncated);
                }
                window_end = (pos + input_window).min(input.len());
                available_in = window_end - pos;
                input_offset = 0;
            }
            BrotliResult::ResultSuccess => {
                if available_in != 0 || window_end != input.len() {
                    return Err(StrategyError::TrailingData);
                }
                return Ok(output);
            }
            BrotliResult::ResultFailure => return Err(StrategyError::Corrupt),
        }
    }
}
