//! The decode pipeline: submission in, parsed JSON or a diagnostic trail out.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

use crate::debug_reader::decompress::{ChainExhausted, DecompressionChain};
use crate::debug_reader::extract::{extract_payload, preview, sanitize};
use crate::debug_reader::input::DebugSubmission;
use crate::debug_reader::trace::DebugTrace;

/// Standard alphabet; padding optional and trailing bits tolerated.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Reasons a submission could not be turned into JSON.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("No content provided")]
    NoContent,

    #[error("Could not read form data: {0}")]
    Multipart(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Decompression(#[from] ChainExhausted),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Terminal result of one pipeline run.
#[derive(Debug)]
pub enum DecodeOutcome {
    Parsed(Value),
    Failed { message: String, trace: DebugTrace },
}

impl DecodeOutcome {
    pub fn failed(error: DecodeError, trace: DebugTrace) -> Self {
        Self::Failed {
            message: error.to_string(),
            trace,
        }
    }
}

/// Stateless decoder shared by all requests.
#[derive(Debug)]
pub struct DecodePipeline {
    chain: DecompressionChain,
    preview_chars: usize,
}

impl DecodePipeline {
    pub fn new(preview_chars: usize) -> Self {
        Self::with_chain(DecompressionChain::standard(), preview_chars)
    }

    pub fn with_chain(chain: DecompressionChain, preview_chars: usize) -> Self {
        Self {
            chain,
            preview_chars,
        }
    }

    /// Decode a submission. Never panics; every failure becomes `Failed` with the trace so far.
    pub fn run(&self, submission: &DebugSubmission) -> DecodeOutcome {
        let mut trace = DebugTrace::new();
        match self.decode(submission, &mut trace) {
            Ok(value) => DecodeOutcome::Parsed(value),
            Err(e) => {
                tracing::warn!(error = %e, steps = trace.len(), "Debug code decoding failed");
                DecodeOutcome::failed(e, trace)
            }
        }
    }

    fn decode(&self, submission: &DebugSubmission, trace: &mut DebugTrace) -> Result<Value, DecodeError> {
        let content = submission.content(trace);
        if content.is_empty() {
            return Err(DecodeError::NoContent);
        }

        let payload = extract_payload(&content, trace);

        let cleaned = sanitize(payload);
        trace.record("Sanitization", format!("Cleaned Base64 length: {}", cleaned.len()));

        let bytes = LENIENT_BASE64.decode(cleaned.as_bytes())?;
        trace.record("Base64 Decode", format!("Byte array length: {}", bytes.len()));

        let decompressed = self.chain.run(&bytes, trace)?;

        trace.record(
            "String Preview",
            format!("{}...", preview(&decompressed.text, self.preview_chars)),
        );

        trace.record("JSON Parse", "Attempting to parse...");
        let value = serde_json::from_str(&decompressed.text)?;
        trace.record("JSON Parse", "Success");

        tracing::info!(strategy = decompressed.strategy, "Debug code decoded");
        Ok(value)
    }
}

impl Default for DecodePipeline {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_reader::decompress::{DecodeStrategy, RawBytes, StrategyError};
    use base64::engine::general_purpose::STANDARD;
    use serde_json::json;
    use std::io::Write;

    fn brotli(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
            writer.write_all(data).unwrap();
        }
        out
    }

    fn encode(value: &Value) -> String {
        STANDARD.encode(brotli(value.to_string().as_bytes()))
    }

    fn failed(outcome: DecodeOutcome) -> (String, DebugTrace) {
        match outcome {
            DecodeOutcome::Failed { message, trace } => (message, trace),
            DecodeOutcome::Parsed(value) => panic!("expected failure, parsed {value}"),
        }
    }

    #[derive(Debug)]
    struct Unavailable;

    impl DecodeStrategy for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        fn label(&self) -> &'static str {
            "Unavailable"
        }

        fn decode(&self, _bytes: &[u8]) -> Result<Vec<u8>, StrategyError> {
            Err(StrategyError::Other("not supported here".to_string()))
        }
    }

    #[test]
    fn test_round_trip_payloads() {
        let pipeline = DecodePipeline::default();
        let payloads = [
            json!({"a": 1}),
            json!([1, 2, 3]),
            json!({"nested": {"list": ["x", "y"], "flag": true, "none": null}}),
            json!("just a string"),
            json!({"unicode": "ünïcødé ✓", "ansi": "\u{1b}[31mred\u{1b}[0m"}),
        ];

        for payload in payloads {
            let submission = DebugSubmission::from_text(encode(&payload));
            match pipeline.run(&submission) {
                DecodeOutcome::Parsed(value) => assert_eq!(value, payload),
                DecodeOutcome::Failed { message, trace } => {
                    panic!("{payload} failed: {message} {trace:?}")
                }
            }
        }
    }

    #[test]
    fn test_markers_with_surrounding_noise() {
        let pipeline = DecodePipeline::default();
        let encoded = encode(&json!({"a": 1}));
        let wrapped: String = encoded
            .as_bytes()
            .chunks(16)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\r\n");
        let text = format!("Copy everything!\nSTART DEBUG CODE\n{wrapped}\nEND DEBUG CODE\nThanks");

        let outcome = pipeline.run(&DebugSubmission::from_text(text));
        assert!(matches!(outcome, DecodeOutcome::Parsed(v) if v == json!({"a": 1})));
    }

    #[test]
    fn test_unterminated_marker() {
        let pipeline = DecodePipeline::default();
        let text = format!("START DEBUG CODE{}", encode(&json!({"open": "ended"})));
        let outcome = pipeline.run(&DebugSubmission::from_text(text));
        assert!(matches!(outcome, DecodeOutcome::Parsed(v) if v == json!({"open": "ended"})));
    }

    #[test]
    fn test_empty_input_fails_with_no_content() {
        let pipeline = DecodePipeline::default();
        let (message, trace) = failed(pipeline.run(&DebugSubmission::from_text("")));
        assert_eq!(message, "No content provided");
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.entries()[0].step, "Input");
    }

    #[test]
    fn test_bad_base64_is_fatal() {
        let pipeline = DecodePipeline::default();
        let (message, trace) = failed(pipeline.run(&DebugSubmission::from_text("START DEBUG CODE A END DEBUG CODE")));
        assert!(message.starts_with("Invalid base64 payload"), "{message}");

        let steps: Vec<_> = trace.entries().iter().map(|e| e.step.as_str()).collect();
        assert_eq!(steps, vec!["Input", "Extraction", "Sanitization"]);
    }

    #[test]
    fn test_legacy_uncompressed_payload() {
        let pipeline = DecodePipeline::default();
        let text = STANDARD.encode(br#"{"legacy": [1, 2]}"#);

        let mut trace = DebugTrace::new();
        let value = pipeline
            .decode(&DebugSubmission::from_text(text), &mut trace)
            .unwrap();
        assert_eq!(value, json!({"legacy": [1, 2]}));
        assert_eq!(trace.details_for("Fallback").count(), 1);
        assert!(trace
            .details_for("Decompression")
            .any(|d| d.starts_with("Fallback library failed:")));
    }

    #[test]
    fn test_unavailable_decompressors_still_try_raw_text() {
        let chain = DecompressionChain::new(vec![
            Box::new(Unavailable),
            Box::new(Unavailable),
            Box::new(RawBytes),
        ]);
        let pipeline = DecodePipeline::with_chain(chain, 100);

        let ok = pipeline.run(&DebugSubmission::from_text(STANDARD.encode(b"[true]")));
        assert!(matches!(ok, DecodeOutcome::Parsed(v) if v == json!([true])));

        let (message, trace) = failed(pipeline.run(&DebugSubmission::from_text(STANDARD.encode(b"not json"))));
        assert!(message.starts_with("Invalid JSON"), "{message}");
        assert_eq!(
            trace.details_for("Fallback").collect::<Vec<_>>(),
            vec!["Decoded raw bytes to string. String length: 8"]
        );
        assert_eq!(
            trace.details_for("JSON Parse").collect::<Vec<_>>(),
            vec!["Attempting to parse..."]
        );
    }

    #[test]
    fn test_preview_is_escaped_and_truncated() {
        let chain = DecompressionChain::new(vec![Box::new(RawBytes)]);
        let pipeline = DecodePipeline::with_chain(chain, 5);
        let text = STANDARD.encode(b"\x1b[1mbold and more");

        let (_, trace) = failed(pipeline.run(&DebugSubmission::from_text(text)));
        assert_eq!(
            trace.details_for("String Preview").collect::<Vec<_>>(),
            vec!["\\u001b[1mb..."]
        );
    }

    #[test]
    fn test_missing_padding_is_accepted() {
        let chain = DecompressionChain::new(vec![Box::new(RawBytes)]);
        let pipeline = DecodePipeline::with_chain(chain, 100);
        // "[12]" encodes to "WzEyXQ==".
        let outcome = pipeline.run(&DebugSubmission::from_text("WzEyXQ"));
        assert!(matches!(outcome, DecodeOutcome::Parsed(v) if v == json!([12])));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let pipeline = DecodePipeline::default();
        let with_bom = b"\xEF\xBB\xBF{\"a\":1}";

        let compressed = DebugSubmission::from_text(STANDARD.encode(brotli(with_bom)));
        assert!(matches!(pipeline.run(&compressed), DecodeOutcome::Parsed(v) if v == json!({"a": 1})));

        let legacy = DebugSubmission::from_text(STANDARD.encode(with_bom));
        assert!(matches!(pipeline.run(&legacy), DecodeOutcome::Parsed(v) if v == json!({"a": 1})));
    }

    #[test]
    fn test_uploaded_file_with_bom() {
        let pipeline = DecodePipeline::default();
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(encode(&json!([1])).as_bytes());
        let submission = DebugSubmission {
            file: Some(crate::debug_reader::input::UploadedFile {
                name: "debug.txt".to_string(),
                bytes,
            }),
            text: None,
        };
        assert!(matches!(pipeline.run(&submission), DecodeOutcome::Parsed(v) if v == json!([1])));
    }

    #[test]
    fn test_trace_reports_each_stage_on_success() {
        let pipeline = DecodePipeline::default();
        let mut trace = DebugTrace::new();
        pipeline
            .decode(&DebugSubmission::from_text(encode(&json!({"a": 1}))), &mut trace)
            .unwrap();

        let steps: Vec<_> = trace.entries().iter().map(|e| e.step.as_str()).collect();
        assert_eq!(
            steps,
            vec![
                "Input",
                "Extraction",
                "Sanitization",
                "Base64 Decode",
                "Decompression",
                "Decompression",
                "String Preview",
                "JSON Parse",
                "JSON Parse",
            ]
        );
    }
}
