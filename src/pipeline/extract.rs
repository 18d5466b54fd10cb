//! Text extraction: PDF bytes → one trimmed outline string.
//!
//! Parsing is done with `lopdf`, entirely in memory. Pages are visited in
//! document order and their text concatenated. A page whose text cannot be
//! decoded (unsupported font encoding, broken content stream, scanned image)
//! contributes nothing and is logged at `warn`; only a missing PDF header or
//! an unparsable document structure fails the whole extraction.
//!
//! Extraction is CPU-bound, so async callers should use
//! [`extract_outline_async`], which moves the work to `spawn_blocking`.

use crate::error::{AssistantError, ExtractionError};
use lopdf::Document;
use tracing::{debug, warn};

/// PDF files start with this header.
const PDF_MAGIC: &[u8] = b"%PDF";

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Trimmed concatenation of every page's text.
    pub text: String,
    /// Pages in the document, including those that yielded no text.
    pub page_count: usize,
}

/// Extract the outline text of `bytes`.
///
/// `name` is only used in error messages and logs.
pub fn extract_outline(name: &str, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExtractionError::NotAPdf {
            name: name.to_string(),
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        });
    }

    let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Corrupt {
        name: name.to_string(),
        detail: e.to_string(),
    })?;

    let mut page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();

    let mut text = String::new();
    for &page in &page_numbers {
        match doc.extract_text(&[page]) {
            Ok(page_text) => {
                debug!("{name}: page {page} yielded {} bytes", page_text.len());
                text.push_str(&page_text);
            }
            Err(e) => {
                warn!("{name}: no text extracted from page {page}: {e}");
            }
        }
    }

    Ok(ExtractedText {
        text: text.trim().to_string(),
        page_count: page_numbers.len(),
    })
}

/// Async wrapper around [`extract_outline`] running on the blocking pool.
pub async fn extract_outline_async(
    name: String,
    bytes: std::sync::Arc<[u8]>,
) -> Result<ExtractedText, AssistantError> {
    tokio::task::spawn_blocking(move || extract_outline(&name, &bytes))
        .await
        .map_err(|e| AssistantError::Internal(format!("extraction task panicked: {e}")))?
        .map_err(AssistantError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::pipeline::export::render_pdf;

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = extract_outline("notes.docx", b"PK\x03\x04rest").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::NotAPdf {
                name: "notes.docx".into(),
                magic: b"PK\x03\x04".to_vec(),
            }
        );
    }

    #[test]
    fn rejects_empty_input() {
        let err = extract_outline("empty.pdf", b"").unwrap_err();
        assert!(matches!(err, ExtractionError::NotAPdf { .. }));
    }

    #[test]
    fn rejects_truncated_pdf() {
        let err = extract_outline("broken.pdf", b"%PDF-1.5\n garbage without xref").unwrap_err();
        assert!(matches!(err, ExtractionError::Corrupt { .. }), "got {err:?}");
    }

    #[test]
    fn pages_are_concatenated_in_order() {
        // Tiny printable area forces one line per page.
        let export = ExportConfig {
            bottom_margin_mm: 270.0,
            margin_mm: 10.0,
            ..ExportConfig::default()
        };
        let bytes = render_pdf("Week one\nWeek two\nWeek three", &export).unwrap();
        let out = extract_outline("outline.pdf", &bytes).unwrap();

        assert_eq!(out.page_count, 3);
        let one = out.text.find("Week one").unwrap();
        let two = out.text.find("Week two").unwrap();
        let three = out.text.find("Week three").unwrap();
        assert!(one < two && two < three, "got {:?}", out.text);
    }

    #[test]
    fn output_is_trimmed() {
        let bytes = render_pdf("Course: Algorithms", &ExportConfig::default()).unwrap();
        let out = extract_outline("outline.pdf", &bytes).unwrap();
        assert_eq!(out.text, out.text.trim());
        assert!(out.text.contains("Course: Algorithms"));
    }

    #[tokio::test]
    async fn async_wrapper_matches_sync() {
        let bytes = render_pdf("Topics: sorting, graphs.", &ExportConfig::default()).unwrap();
        let sync = extract_outline("o.pdf", &bytes).unwrap();
        let asynced = extract_outline_async("o.pdf".into(), bytes.into()).await.unwrap();
        assert_eq!(sync, asynced);
    }
}
