//! Text-level stages: marker extraction, base64 sanitization and previews.

use crate::debug_reader::trace::DebugTrace;

/// Literal that precedes the encoded payload.
pub const START_MARKER: &str = "START DEBUG CODE";

/// Literal that terminates the encoded payload.
pub const END_MARKER: &str = "END DEBUG CODE";

/// Cut the payload out of its surrounding text.
///
/// Without a start marker the whole content is returned unchanged. A start
/// marker with no end marker after it yields everything after the start marker.
pub fn extract_payload<'a>(content: &'a str, trace: &mut DebugTrace) -> &'a str {
    let Some(found) = content.find(START_MARKER) else {
        trace.record("Extraction", "No markers found. Using full content.");
        return content;
    };

    let rest = &content[found + START_MARKER.len()..];
    let payload = match rest.find(END_MARKER) {
        Some(end) => &rest[..end],
        None => rest,
    };
    trace.record(
        "Extraction",
        format!("Found markers. Extracted length: {}", payload.chars().count()),
    );
    payload
}

/// Drop every character outside the padded standard base64 alphabet.
pub fn sanitize(payload: &str) -> String {
    payload
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect()
}

/// First `max_chars` characters with C0 and C1 control characters escaped as `\uXXXX`.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(max_chars);
    for c in text.chars().take(max_chars) {
        if is_control(c) {
            out.push_str(&format!("\\u{:04x}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

/// Lossy UTF-8 decoding that drops a leading byte order mark.
pub fn decode_utf8(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

fn is_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1F | 0x7F..=0x9F)
}
