//! Result types: submission outcomes and downloadable export artifacts.

use crate::config::ExportConfig;
use crate::error::{AssistantError, RenderError};
use crate::history::InteractionRecord;
use crate::operation::Guidance;
use crate::pipeline::export::render_pdf;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// A precondition failed; nothing ran and the log is unchanged.
    NeedsInput { guidance: Guidance },
    /// Every selected operation succeeded. Records are in execution order.
    Completed { records: Vec<InteractionRecord> },
}

impl SubmissionOutcome {
    pub fn guidance(&self) -> Option<Guidance> {
        match self {
            SubmissionOutcome::NeedsInput { guidance } => Some(*guidance),
            SubmissionOutcome::Completed { .. } => None,
        }
    }

    /// New records, empty when the submission needed input.
    pub fn records(&self) -> &[InteractionRecord] {
        match self {
            SubmissionOutcome::NeedsInput { .. } => &[],
            SubmissionOutcome::Completed { records } => records,
        }
    }
}

/// Download format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Text,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Text => "txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }
}

/// A downloadable rendering of one response.
///
/// Derived on demand and never stored by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Render `record`'s response in `format`.
    ///
    /// Text exports are the response as UTF-8 and cannot fail. PDF exports
    /// fail with [`RenderError`] when the response holds characters the
    /// configured encoding policy rejects.
    pub fn render(
        record: &InteractionRecord,
        format: ExportFormat,
        export: &ExportConfig,
    ) -> Result<Self, RenderError> {
        let bytes = match format {
            ExportFormat::Pdf => render_pdf(record.response(), export)?,
            ExportFormat::Text => record.response().as_bytes().to_vec(),
        };
        Ok(Self {
            file_name: format!("{}.{}", record.kind().file_stem(), format.extension()),
            mime_type: format.mime_type(),
            bytes,
        })
    }

    /// Write the artifact into `dir` and return the final path.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    pub async fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AssistantError> {
        let dir = dir.as_ref();
        let path = dir.join(&self.file_name);
        let write_err = |source| AssistantError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(dir).await.map_err(write_err)?;

        let tmp_path = dir.join(format!(".{}.tmp", self.file_name));
        tokio::fs::write(&tmp_path, &self.bytes)
            .await
            .map_err(write_err)?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(write_err)?;

        info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}
