//! Input resolution: turn a user-supplied path or URL into an in-memory
//! [`UploadedDocument`].
//!
//! The whole file is read into memory: extraction parses from a byte slice
//! and the document id is a hash of those bytes. PDF validation is left to
//! the extractor so local files, URLs and in-memory uploads all fail the
//! same way.

use crate::document::UploadedDocument;
use crate::error::AssistantError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Fallback name when a URL has no usable last path segment.
const DEFAULT_DOWNLOAD_NAME: &str = "downloaded.pdf";

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to an uploaded document.
///
/// URLs are downloaded with a `timeout_secs` limit; anything else is read
/// as a local path.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<UploadedDocument, AssistantError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AssistantError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

/// Read a local file, mapping I/O failures to input errors.
async fn read_local(path: &Path) -> Result<UploadedDocument, AssistantError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => AssistantError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => AssistantError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => AssistantError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(UploadedDocument::from_bytes(name, bytes))
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<UploadedDocument, AssistantError> {
    info!("Downloading PDF from: {}", url);

    let parsed = reqwest::Url::parse(url).map_err(|_| AssistantError::InvalidInput {
        input: url.to_string(),
    })?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AssistantError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_err = |e: reqwest::Error| {
        if e.is_timeout() {
            AssistantError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            AssistantError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(parsed.clone()).send().await.map_err(map_err)?;

    if !response.status().is_success() {
        return Err(AssistantError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_err)?;
    let name = filename_from_url(&parsed);

    info!("Downloaded {} ({} bytes)", name, bytes.len());
    Ok(UploadedDocument::from_bytes(name, bytes.to_vec()))
}

/// Last non-empty path segment that looks like a file name.
fn filename_from_url(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|last| !last.is_empty() && last.contains('.'))
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_filename_from_url() {
        let u = reqwest::Url::parse("https://uni.example/courses/cs101/outline.pdf?v=2").unwrap();
        assert_eq!(filename_from_url(&u), "outline.pdf");
        let u = reqwest::Url::parse("https://uni.example/courses/").unwrap();
        assert_eq!(filename_from_url(&u), "downloaded.pdf");
        let u = reqwest::Url::parse("https://uni.example/download").unwrap();
        assert_eq!(filename_from_url(&u), "downloaded.pdf");
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.pdf");
        let err = resolve_input(path.to_str().unwrap(), 5).await.unwrap_err();
        assert!(matches!(err, AssistantError::FileNotFound { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn directory_is_a_read_failure_not_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_input(dir.path().to_str().unwrap(), 5).await.unwrap_err();
        assert!(matches!(err, AssistantError::ReadFailed { .. }), "got {err:?}");
        assert!(!err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn local_file_is_read_with_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.pdf");
        std::fs::write(&path, b"%PDF-1.5 test").unwrap();

        let doc = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(doc.name(), "outline.pdf");
        assert_eq!(doc.bytes(), b"%PDF-1.5 test");
    }

    #[tokio::test]
    async fn blank_input_is_invalid() {
        let err = resolve_input("   ", 5).await.unwrap_err();
        assert!(matches!(err, AssistantError::InvalidInput { .. }));
    }
}
