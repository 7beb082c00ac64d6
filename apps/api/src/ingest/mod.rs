//! Plain-text extraction from uploaded resume files.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

mod docx;

pub use docx::extract_docx_text;

/// Anything shorter is treated as empty or an image-only scan.
pub const MIN_TEXT_CHARS: usize = 50;

/// Request body cap for uploads.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const PDF: &str = "application/pdf";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MSWORD: &str = "application/msword";
pub const PLAIN_TEXT: &str = "text/plain";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Only PDF, DOCX, or TXT files are allowed")]
    UnsupportedType(String),

    #[error("Could not read the uploaded file. Please upload a valid PDF or DOCX.")]
    Unreadable(String),

    #[error("The file appears to be empty or is a scanned image PDF. Please upload a text-based PDF or DOCX.")]
    TooShort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    /// Media-type parameters such as `; charset=utf-8` are ignored.
    pub fn from_content_type(content_type: &str) -> Result<Self, IngestError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF => Ok(DocumentKind::Pdf),
            DOCX | MSWORD => Ok(DocumentKind::Docx),
            PLAIN_TEXT => Ok(DocumentKind::Text),
            _ => Err(IngestError::UnsupportedType(essence)),
        }
    }
}

pub async fn extract_text(bytes: Bytes, content_type: &str) -> Result<String, IngestError> {
    let kind = DocumentKind::from_content_type(content_type)?;
    debug!("Extracting text from {kind:?}, {} bytes", bytes.len());

    let text = match kind {
        DocumentKind::Pdf => tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| IngestError::Unreadable(e.to_string()))?
            .map_err(|e| IngestError::Unreadable(e.to_string()))?,
        DocumentKind::Docx => extract_docx_text(&bytes)?,
        DocumentKind::Text => String::from_utf8_lossy(&bytes).into_owned(),
    };

    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return Err(IngestError::TooShort);
    }
    Ok(text)
}
