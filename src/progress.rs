//! Progress-callback trait for busy-indicator events.
//!
//! Inject an [`Arc<dyn SessionProgressCallback>`] via
//! [`crate::config::AssistantConfigBuilder::progress_callback`] to hear about
//! outline extraction and each generation request while a session works.
//! Front-ends use it to drive a spinner; the library never draws anything.
//!
//! # Example
//!
//! ```rust
//! use semester_assistant::{AssistantConfig, OperationKind, SessionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl SessionProgressCallback for CountingCallback {
//!     fn on_operation_complete(&self, kind: OperationKind, response_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} done ({} bytes)", kind.label_prefix(), response_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = AssistantConfig::builder()
//!     .progress_callback(counter as Arc<dyn SessionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::operation::OperationKind;
use std::sync::Arc;

/// Called by a [`crate::Session`] as it extracts outlines and runs operations.
///
/// All methods default to no-ops so callers only override what they care
/// about. A session runs its work sequentially, so calls never overlap for
/// one session; a callback shared across sessions must still be `Sync`.
pub trait SessionProgressCallback: Send + Sync {
    /// Called before text extraction of a newly loaded document.
    ///
    /// Not called when the cached outline is reused.
    fn on_extraction_start(&self, document_name: &str) {
        let _ = document_name;
    }

    /// Called after extraction succeeded.
    ///
    /// # Arguments
    /// * `page_count`  — pages in the document, including empty ones
    /// * `outline_len` — byte length of the extracted outline
    fn on_extraction_complete(&self, page_count: usize, outline_len: usize) {
        let _ = (page_count, outline_len);
    }

    /// Called just before the prompt for `kind` is sent.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position of this operation in the submission
    /// * `total` — number of operations selected in the submission
    fn on_operation_start(&self, kind: OperationKind, index: usize, total: usize) {
        let _ = (kind, index, total);
    }

    /// Called when the normalised response for `kind` is ready.
    fn on_operation_complete(&self, kind: OperationKind, response_len: usize) {
        let _ = (kind, response_len);
    }

    /// Called when `kind` fails. The submission is abandoned afterwards.
    fn on_operation_error(&self, kind: OperationKind, error: &str) {
        let _ = (kind, error);
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl SessionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AssistantConfig`].
pub type ProgressCallback = Arc<dyn SessionProgressCallback>;
