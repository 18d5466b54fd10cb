//! # semester-assistant
//!
//! Ask questions about a PDF semester outline and generate quizzes and
//! assignment briefs from it with Google Gemini.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      local file or URL → in-memory upload (sha256 identity)
//!  ├─ 2. Extract    per-page text via lopdf (CPU-bound, spawn_blocking),
//!  │                cached per session by document id
//!  ├─ 3. Prompt     fixed template per operation: ask / assignment / quiz
//!  ├─ 4. Complete   one Gemini generateContent call per operation
//!  ├─ 5. Normalize  collapse blank-line and space runs, trim
//!  ├─ 6. History    newest-first conversation log
//!  └─ 7. Export     Courier PDF or plain text, on demand
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use semester_assistant::{
//!     resolve_input, AssistantConfig, GeminiClient, OperationKind, OperationSet, Session,
//!     Submission,
//! };
//! use secrecy::SecretString;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AssistantConfig::default();
//!     let key = SecretString::from(std::env::var("GEMINI_API_KEY")?);
//!     let client = GeminiClient::new(key, &config)?;
//!     let mut session = Session::new(Arc::new(client), config);
//!
//!     let doc = resolve_input("outline.pdf", 120).await?;
//!     session.load_document(&doc).await?;
//!
//!     let quiz = Submission::new("", OperationSet::only(OperationKind::GenerateQuiz));
//!     session.submit(&quiz).await?;
//!     for record in session.history() {
//!         println!("{}\n{}\n", record.label(), record.response());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `semester` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! semester-assistant = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod history;
pub mod operation;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AssistantConfig, AssistantConfigBuilder, EncodingPolicy, ExportConfig, PaperSize};
pub use document::{DocumentId, Outline, UploadedDocument};
pub use error::{AssistantError, CompletionError, ExtractionError, RenderError};
pub use history::{ConversationLog, InteractionRecord};
pub use operation::{check_preconditions, Guidance, OperationKind, OperationSet, Submission};
pub use output::{ExportArtifact, ExportFormat, SubmissionOutcome};
pub use pipeline::extract::{extract_outline, ExtractedText};
pub use pipeline::input::resolve_input;
pub use pipeline::llm::{CompletionClient, GeminiClient};
pub use pipeline::normalize::normalize;
pub use progress::{NoopProgressCallback, ProgressCallback, SessionProgressCallback};
pub use session::Session;
