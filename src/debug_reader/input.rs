//! Multipart submission handling.

use axum::extract::multipart::{Multipart, MultipartError};

use crate::debug_reader::extract::decode_utf8;
use crate::debug_reader::trace::DebugTrace;

/// Form field carrying an uploaded debug file.
pub const FILE_FIELD: &str = "fileInput";

/// Form field carrying pasted debug text.
pub const TEXT_FIELD: &str = "textInput";

/// An uploaded file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The two candidate inputs of a debug reader form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugSubmission {
    pub file: Option<UploadedFile>,
    pub text: Option<String>,
}

impl DebugSubmission {
    /// Submission consisting only of pasted text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            file: None,
            text: Some(text.into()),
        }
    }

    /// Read every part of a multipart body, keeping the last value of each known field.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().map(str::to_string);
            match field_name.as_deref() {
                Some(FILE_FIELD) => {
                    // Text parts named like the file field are not uploads.
                    let Some(name) = field.file_name().map(str::to_string) else {
                        continue;
                    };
                    let bytes = field.bytes().await?;
                    submission.file = Some(UploadedFile {
                        name,
                        bytes: bytes.to_vec(),
                    });
                }
                Some(TEXT_FIELD) => {
                    submission.text = Some(field.text().await?);
                }
                _ => {}
            }
        }

        Ok(submission)
    }

    /// Choose the content to decode: a non-empty file wins over the text field.
    pub fn content(&self, trace: &mut DebugTrace) -> String {
        if let Some(file) = self.file.as_ref().filter(|f| !f.bytes.is_empty()) {
            trace.record(
                "Input",
                format!("File: {} ({} bytes)", file.name, file.bytes.len()),
            );
            return decode_utf8(&file.bytes);
        }

        let text = self.text.clone().unwrap_or_default();
        trace.record("Input", format!("Text input ({} chars)", text.chars().count()));
        text
    }
}
