//! Uploaded documents and their extracted outlines.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Content identity of an uploaded document: hex SHA-256 of its bytes.
///
/// Two uploads with identical bytes share an id whatever their names, so the
/// outline cache survives re-uploading the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn of(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Twelve hex digits are plenty for log lines.
        f.write_str(&self.0[..12.min(self.0.len())])
    }
}

/// A PDF supplied by the user, held in memory.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    name: String,
    bytes: Arc<[u8]>,
    id: DocumentId,
}

impl UploadedDocument {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        let id = DocumentId::of(&bytes);
        Self {
            name: name.into(),
            bytes: bytes.into(),
            id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }
}

/// Extracted text of one document. Cheap to clone, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline(Arc<str>);

impl Outline {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Outline {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
