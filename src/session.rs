//! One user's working state: the loaded outline, the completion client and
//! the conversation log.
//!
//! ## Lifecycle
//!
//! ```text
//! Session::new(client, config)
//!     │
//!     ├─ load_document(doc) ──▶ extract (only when the document id changed)
//!     │
//!     └─ submit(submission)
//!           ├─ preconditions ──▶ NeedsInput(guidance), nothing runs
//!           └─ for kind in Ask → Assignment → Quiz:
//!                 build_prompt ──▶ client.complete ──▶ normalize
//!              all succeeded ──▶ append to log, Completed(records)
//!              any failed    ──▶ Err, log untouched
//! ```
//!
//! A session is a plain owned value. Submissions take `&mut self`, so one
//! session's operations are strictly sequential, while separate sessions can
//! live on separate tokio tasks with nothing shared between them.

use crate::config::AssistantConfig;
use crate::document::{DocumentId, Outline, UploadedDocument};
use crate::error::{AssistantError, CompletionError};
use crate::history::{ConversationLog, InteractionRecord};
use crate::operation::{check_preconditions, Submission};
use crate::output::SubmissionOutcome;
use crate::pipeline::extract::extract_outline_async;
use crate::pipeline::llm::CompletionClient;
use crate::pipeline::normalize::normalize;
use crate::progress::{NoopProgressCallback, SessionProgressCallback};
use crate::prompts::build_prompt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The outline cache entry for the current document.
#[derive(Debug, Clone)]
struct LoadedDocument {
    id: DocumentId,
    name: String,
    outline: Outline,
}

/// Interactive state for one user.
pub struct Session {
    client: Arc<dyn CompletionClient>,
    config: AssistantConfig,
    document: Option<LoadedDocument>,
    log: ConversationLog,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("document", &self.document.as_ref().map(|d| &d.name))
            .field("history_len", &self.log.len())
            .finish()
    }
}

impl Session {
    /// Create a session around an already-authenticated client.
    pub fn new(client: Arc<dyn CompletionClient>, config: AssistantConfig) -> Self {
        Self {
            client,
            config,
            document: None,
            log: ConversationLog::new(),
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Make `doc` the session's document and return its outline.
    ///
    /// Extraction only runs when `doc`'s content differs from the document
    /// already loaded. Loading a different document drops the previous
    /// outline first, so a failed load leaves the session with no document.
    pub async fn load_document(&mut self, doc: &UploadedDocument) -> Result<Outline, AssistantError> {
        if let Some(loaded) = &self.document {
            if loaded.id == *doc.id() {
                debug!("Reusing outline of {} ({})", loaded.name, loaded.id);
                return Ok(loaded.outline.clone());
            }
            info!("New document {} replaces {}", doc.name(), loaded.name);
        }
        self.document = None;

        let progress = self.progress();
        progress.on_extraction_start(doc.name());

        let extracted = extract_outline_async(doc.name().to_string(), doc.shared_bytes()).await?;
        if extracted.text.is_empty() {
            warn!(
                "{}: no text extracted from {} page(s); is it a scanned document?",
                doc.name(),
                extracted.page_count
            );
        }
        progress.on_extraction_complete(extracted.page_count, extracted.text.len());
        info!(
            "Extracted {} ({} pages, {} bytes of text)",
            doc.name(),
            extracted.page_count,
            extracted.text.len()
        );

        let outline = Outline::new(extracted.text);
        self.document = Some(LoadedDocument {
            id: doc.id().clone(),
            name: doc.name().to_string(),
            outline: outline.clone(),
        });
        Ok(outline)
    }

    /// Run every selected operation of `submission` against the outline.
    ///
    /// On success the new records are appended to the log in execution
    /// order, leaving the last operation run at position 0. On any failure
    /// the error is returned and the log is left exactly as it was.
    pub async fn submit(&mut self, submission: &Submission) -> Result<SubmissionOutcome, AssistantError> {
        let has_document = self.document.is_some();
        if let Some(guidance) = check_preconditions(has_document, true, submission) {
            debug!("Submission needs input: {guidance:?}");
            return Ok(SubmissionOutcome::NeedsInput { guidance });
        }
        let Some(outline) = self.document.as_ref().map(|d| d.outline.clone()) else {
            return Err(AssistantError::Internal("document vanished during submit".into()));
        };

        let query = submission.query.trim();
        let kinds = submission.operations.kinds();
        let total = kinds.len();
        let progress = self.progress();
        let mut records = Vec::with_capacity(total);

        for (idx, kind) in kinds.into_iter().enumerate() {
            let prompt = build_prompt(&outline, kind, query);
            progress.on_operation_start(kind, idx + 1, total);
            debug!("{kind}: sending {} prompt bytes", prompt.len());

            let response = match self.client.complete(&prompt).await {
                Ok(raw) => normalize(&raw),
                Err(e) => {
                    progress.on_operation_error(kind, &e.to_string());
                    warn!("{kind} failed, abandoning submission: {e}");
                    return Err(e.into());
                }
            };
            if response.is_empty() {
                let e = CompletionError::EmptyResponse;
                progress.on_operation_error(kind, &e.to_string());
                warn!("{kind} produced only whitespace, abandoning submission");
                return Err(e.into());
            }

            progress.on_operation_complete(kind, response.len());
            records.push(InteractionRecord::new(kind, query, response));
        }

        for record in &records {
            self.log.append(record.clone());
        }
        info!("Submission complete: {} new record(s), {} total", records.len(), self.log.len());
        Ok(SubmissionOutcome::Completed { records })
    }

    /// Conversation log, newest first.
    pub fn history(&self) -> &ConversationLog {
        &self.log
    }

    pub fn outline(&self) -> Option<&Outline> {
        self.document.as_ref().map(|d| &d.outline)
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document.as_ref().map(|d| &d.id)
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.name.as_str())
    }

    fn progress(&self) -> Arc<dyn SessionProgressCallback> {
        match &self.config.progress_callback {
            Some(cb) => Arc::clone(cb),
            None => Arc::new(NoopProgressCallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::operation::{Guidance, OperationKind, OperationSet};
    use crate::pipeline::export::render_pdf;
    use crate::pipeline::llm::MockCompletionClient;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pdf(text: &str, name: &str) -> UploadedDocument {
        let bytes = render_pdf(text, &ExportConfig::default()).unwrap();
        UploadedDocument::from_bytes(name, bytes)
    }

    #[derive(Default)]
    struct ExtractionCounter {
        starts: AtomicUsize,
    }

    impl SessionProgressCallback for ExtractionCounter {
        fn on_extraction_start(&self, _document_name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session_with(mock: MockCompletionClient) -> (Session, Arc<ExtractionCounter>) {
        let counter = Arc::new(ExtractionCounter::default());
        let config = AssistantConfig::builder()
            .progress_callback(counter.clone())
            .build()
            .unwrap();
        (Session::new(Arc::new(mock), config), counter)
    }

    #[tokio::test]
    async fn same_document_is_extracted_once() {
        let (mut session, counter) = session_with(MockCompletionClient::new());
        let doc = pdf("Course: Algorithms", "outline.pdf");

        let first = session.load_document(&doc).await.unwrap();
        let renamed = UploadedDocument::from_bytes("copy.pdf", doc.bytes().to_vec());
        let second = session.load_document(&renamed).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(counter.starts.load(Ordering::SeqCst), 1);
        assert_eq!(session.document_id(), Some(doc.id()));
    }

    #[tokio::test]
    async fn different_document_replaces_outline() {
        let (mut session, counter) = session_with(MockCompletionClient::new());
        session.load_document(&pdf("Course: Algorithms", "a.pdf")).await.unwrap();
        let outline = session.load_document(&pdf("Course: Databases", "b.pdf")).await.unwrap();

        assert!(outline.contains("Databases"));
        assert!(!outline.contains("Algorithms"));
        assert_eq!(counter.starts.load(Ordering::SeqCst), 2);
        assert_eq!(session.document_name(), Some("b.pdf"));
    }

    #[tokio::test]
    async fn failed_load_clears_previous_document() {
        let (mut session, _) = session_with(MockCompletionClient::new());
        session.load_document(&pdf("Course: Algorithms", "a.pdf")).await.unwrap();

        let bad = UploadedDocument::from_bytes("notes.txt", b"just text".to_vec());
        let err = session.load_document(&bad).await.unwrap_err();
        assert!(matches!(err, AssistantError::Extraction(_)));
        assert!(session.outline().is_none());
    }

    #[tokio::test]
    async fn no_document_needs_input() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete().never();
        let (mut session, _) = session_with(mock);

        let outcome = session
            .submit(&Submission::new("", OperationSet::only(OperationKind::GenerateQuiz)))
            .await
            .unwrap();
        assert_eq!(outcome.guidance(), Some(Guidance::NoDocument));
    }

    #[tokio::test]
    async fn no_operation_selected_runs_nothing() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete().never();
        let (mut session, _) = session_with(mock);
        session.load_document(&pdf("Course: Algorithms", "a.pdf")).await.unwrap();

        let outcome = session
            .submit(&Submission::new("anything", OperationSet::default()))
            .await
            .unwrap();
        assert_eq!(outcome.guidance(), Some(Guidance::NoOperationSelected));
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn all_kinds_run_in_order_and_log_newest_first() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete()
            .withf(|p| p.contains("Now answer this user query: When is week 3?"))
            .times(1)
            .returning(|_| Ok("Week 3 covers graphs.".to_string()));
        mock.expect_complete()
            .withf(|p| p.contains("assignment prompt"))
            .times(1)
            .returning(|_| Ok("Title:   Graph   Lab\n\n\n\nTasks".to_string()));
        mock.expect_complete()
            .withf(|p| p.contains("5 multiple-choice questions"))
            .times(1)
            .returning(|_| Ok("Q1. ...\nAnswer: A".to_string()));
        let (mut session, _) = session_with(mock);
        session.load_document(&pdf("Course: Algorithms", "a.pdf")).await.unwrap();

        let all = OperationSet {
            ask: true,
            quiz: true,
            assignment: true,
        };
        let outcome = session.submit(&Submission::new("When is week 3?", all)).await.unwrap();

        let ran: Vec<OperationKind> = outcome.records().iter().map(|r| r.kind()).collect();
        assert_eq!(
            ran,
            vec![
                OperationKind::AskQuestion,
                OperationKind::GenerateAssignment,
                OperationKind::GenerateQuiz,
            ]
        );

        let labels: Vec<&str> = session.history().iter().map(|r| r.label()).collect();
        assert_eq!(
            labels,
            vec![
                "[Quiz] When is week 3?",
                "[Assignment] When is week 3?",
                "[Ask a Question] When is week 3?",
            ]
        );
        assert_eq!(
            session.history().get(1).map(|r| r.response()),
            Some("Title: Graph Lab\n\nTasks")
        );
    }

    #[tokio::test]
    async fn failure_mid_submission_keeps_log_unchanged() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete()
            .withf(|p| p.contains("Now answer this user query"))
            .returning(|_| Ok("fine".to_string()));
        mock.expect_complete()
            .withf(|p| p.contains("multiple-choice"))
            .returning(|_| {
                Err(CompletionError::QuotaExceeded {
                    detail: "429".into(),
                })
            });
        let (mut session, _) = session_with(mock);
        session.load_document(&pdf("Course: Algorithms", "a.pdf")).await.unwrap();

        let first = Submission::new("q1", OperationSet::only(OperationKind::AskQuestion));
        session.submit(&first).await.unwrap();
        assert_eq!(session.history().len(), 1);

        let both = OperationSet {
            ask: true,
            quiz: true,
            assignment: false,
        };
        let err = session.submit(&Submission::new("q2", both)).await.unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Completion(CompletionError::QuotaExceeded { .. })
        ));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().latest().map(|r| r.label()), Some("[Ask a Question] q1"));
    }

    #[tokio::test]
    async fn whitespace_only_completion_is_an_error() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete().returning(|_| Ok(" \n\n\t ".to_string()));
        let (mut session, _) = session_with(mock);
        session.load_document(&pdf("Course: Algorithms", "a.pdf")).await.unwrap();

        let err = session
            .submit(&Submission::new("", OperationSet::only(OperationKind::GenerateQuiz)))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Completion(CompletionError::EmptyResponse)));
        assert!(session.history().is_empty());
    }
}
