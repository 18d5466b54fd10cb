//! Error types for the semester-assistant library.
//!
//! Three error classes mirror the three places a user action can fail:
//!
//! * [`ExtractionError`] — the uploaded file is not a readable PDF.
//! * [`CompletionError`] — the generation service did not produce text
//!   (bad credential, quota, network, malformed or empty reply).
//! * [`RenderError`] — a response cannot be written to the PDF export.
//!
//! [`AssistantError`] wraps all three together with input and I/O failures.
//! Every variant is terminal for the action that raised it: the action is
//! abandoned and [`AssistantError::notice`] gives the one message shown to
//! the user.

use std::path::PathBuf;
use thiserror::Error;

/// The uploaded bytes could not be turned into an outline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// The bytes do not start with the `%PDF` header.
    #[error("Document '{name}' is not a PDF (first bytes: {magic:?})")]
    NotAPdf { name: String, magic: Vec<u8> },

    /// The header is present but the structure cannot be parsed.
    #[error("PDF '{name}' is corrupt or unreadable: {detail}")]
    Corrupt { name: String, detail: String },
}

/// The external generation service failed to return usable text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    /// Credential rejected (HTTP 401/403 or an invalid-key payload).
    #[error("Credential rejected by the generation service: {detail}")]
    Unauthorized { detail: String },

    /// HTTP 429: quota or rate limit exhausted.
    #[error("Generation service quota exceeded: {detail}")]
    QuotaExceeded { detail: String },

    /// The request never produced an HTTP response.
    #[error("Network error talking to the generation service: {detail}")]
    Network { detail: String },

    /// Any other non-success HTTP status.
    #[error("Generation service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The body could not be decoded as a completion payload.
    #[error("Malformed response from the generation service: {detail}")]
    MalformedResponse { detail: String },

    /// The service answered but produced no text (e.g. blocked prompt).
    #[error("Generation service returned an empty completion")]
    EmptyResponse,
}

/// A response could not be encoded into the PDF export.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The character has no glyph in the export font's encoding.
    #[error("Character {ch:?} on line {line} cannot be encoded for PDF export")]
    UnsupportedCharacter { ch: char, line: usize },

    /// lopdf failed to serialise the document.
    #[error("Failed to write PDF document: {0}")]
    Serialise(String),
}

/// All fatal errors returned by the semester-assistant library.
#[derive(Debug, Error)]
pub enum AssistantError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The path exists but could not be read as a file (a directory, an I/O error).
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input string is not a usable path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Pipeline errors ───────────────────────────────────────────────────
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an export file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssistantError {
    /// The single human-readable notice shown for this failure.
    ///
    /// Every completion failure maps to the same message regardless of the
    /// underlying cause; the detailed error is logged, not shown.
    pub fn notice(&self) -> &'static str {
        match self {
            AssistantError::FileNotFound { .. }
            | AssistantError::PermissionDenied { .. }
            | AssistantError::ReadFailed { .. }
            | AssistantError::InvalidInput { .. }
            | AssistantError::DownloadFailed { .. }
            | AssistantError::DownloadTimeout { .. } => {
                "The outline could not be loaded. Check the file path or URL and try again."
            }
            AssistantError::Extraction(_) => {
                "The uploaded file could not be read. Make sure it is a valid PDF."
            }
            AssistantError::Completion(_) => {
                "The AI service could not generate a response. Check your API key and quota, then try again."
            }
            AssistantError::Render(_) => {
                "This response contains characters that cannot be exported to PDF. Use the text download instead."
            }
            AssistantError::OutputWriteFailed { .. } => {
                "The export file could not be written."
            }
            AssistantError::InvalidConfig(_) | AssistantError::Internal(_) => {
                "Something went wrong. Please try again."
            }
        }
    }
}
