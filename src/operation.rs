//! Operation kinds, submissions and precondition guidance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user asked the assistant to do with the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    AskQuestion,
    GenerateQuiz,
    GenerateAssignment,
}

impl OperationKind {
    /// Execution order when several kinds are selected together.
    pub const RUN_ORDER: [OperationKind; 3] = [
        OperationKind::AskQuestion,
        OperationKind::GenerateAssignment,
        OperationKind::GenerateQuiz,
    ];

    /// Bracketed prefix used in history labels.
    pub fn label_prefix(self) -> &'static str {
        match self {
            OperationKind::AskQuestion => "[Ask a Question]",
            OperationKind::GenerateQuiz => "[Quiz]",
            OperationKind::GenerateAssignment => "[Assignment]",
        }
    }

    /// History label for a record produced by this kind.
    ///
    /// Quiz and assignment labels drop the query when it is blank.
    pub fn label(self, query: &str) -> String {
        let query = query.trim();
        if query.is_empty() {
            self.label_prefix().to_string()
        } else {
            format!("{} {}", self.label_prefix(), query)
        }
    }

    /// Stem of the export file name (`quiz`, `assignment`, `answer`).
    pub fn file_stem(self) -> &'static str {
        match self {
            OperationKind::AskQuestion => "answer",
            OperationKind::GenerateQuiz => "quiz",
            OperationKind::GenerateAssignment => "assignment",
        }
    }

    /// Whether the operation is meaningless without a query.
    pub fn requires_query(self) -> bool {
        matches!(self, OperationKind::AskQuestion)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::AskQuestion => "Ask a Question",
            OperationKind::GenerateQuiz => "Generate Quiz",
            OperationKind::GenerateAssignment => "Generate Assignment",
        };
        f.write_str(name)
    }
}

/// The operation toggles selected for one submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSet {
    pub ask: bool,
    pub quiz: bool,
    pub assignment: bool,
}

impl OperationSet {
    /// A set containing only `kind`.
    pub fn only(kind: OperationKind) -> Self {
        let mut set = Self::default();
        set.set(kind, true);
        set
    }

    pub fn contains(&self, kind: OperationKind) -> bool {
        match kind {
            OperationKind::AskQuestion => self.ask,
            OperationKind::GenerateQuiz => self.quiz,
            OperationKind::GenerateAssignment => self.assignment,
        }
    }

    pub fn set(&mut self, kind: OperationKind, enabled: bool) {
        match kind {
            OperationKind::AskQuestion => self.ask = enabled,
            OperationKind::GenerateQuiz => self.quiz = enabled,
            OperationKind::GenerateAssignment => self.assignment = enabled,
        }
    }

    /// Flip `kind` and return its new state.
    pub fn toggle(&mut self, kind: OperationKind) -> bool {
        let now = !self.contains(kind);
        self.set(kind, now);
        now
    }

    pub fn is_empty(&self) -> bool {
        !(self.ask || self.quiz || self.assignment)
    }

    /// Selected kinds in execution order.
    pub fn kinds(&self) -> Vec<OperationKind> {
        OperationKind::RUN_ORDER
            .into_iter()
            .filter(|k| self.contains(*k))
            .collect()
    }
}

impl FromIterator<OperationKind> for OperationSet {
    fn from_iter<I: IntoIterator<Item = OperationKind>>(iter: I) -> Self {
        let mut set = Self::default();
        for kind in iter {
            set.set(kind, true);
        }
        set
    }
}

/// One user action: a query plus the operations to run against the outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub query: String,
    pub operations: OperationSet,
}

impl Submission {
    pub fn new(query: impl Into<String>, operations: OperationSet) -> Self {
        Self {
            query: query.into(),
            operations,
        }
    }
}

/// A precondition that must be resolved before the pipeline runs.
///
/// Guidance is not an error: nothing was attempted and nothing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guidance {
    NoDocument,
    NoCredential,
    NoOperationSelected,
    MissingQuery,
}

impl Guidance {
    /// The fixed message shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            Guidance::NoDocument => {
                "Please provide a PDF outline: pass a file path or URL as INPUT, or set SEMESTER_INPUT."
            }
            Guidance::NoCredential => "Please enter your Gemini API key to proceed.",
            Guidance::NoOperationSelected => {
                "Please select at least one action: Ask a Question, Generate Assignment or Generate Quiz."
            }
            Guidance::MissingQuery => "Please enter your input to ask a question.",
        }
    }
}

impl fmt::Display for Guidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// First unmet precondition for `submission`, if any.
///
/// Checked in the order document, credential, operation selection, query.
pub fn check_preconditions(
    has_document: bool,
    has_credential: bool,
    submission: &Submission,
) -> Option<Guidance> {
    if !has_document {
        return Some(Guidance::NoDocument);
    }
    if !has_credential {
        return Some(Guidance::NoCredential);
    }
    if submission.operations.is_empty() {
        return Some(Guidance::NoOperationSelected);
    }
    let needs_query = submission.operations.kinds().iter().any(|k| k.requires_query());
    if needs_query && submission.query.trim().is_empty() {
        return Some(Guidance::MissingQuery);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_history_format() {
        assert_eq!(
            OperationKind::AskQuestion.label("When is the final?"),
            "[Ask a Question] When is the final?"
        );
        assert_eq!(OperationKind::GenerateQuiz.label(""), "[Quiz]");
        assert_eq!(OperationKind::GenerateAssignment.label("  "), "[Assignment]");
        assert_eq!(OperationKind::GenerateQuiz.label("week 2"), "[Quiz] week 2");
    }

    #[test]
    fn kinds_run_ask_then_assignment_then_quiz() {
        let all = OperationSet {
            ask: true,
            quiz: true,
            assignment: true,
        };
        assert_eq!(
            all.kinds(),
            vec![
                OperationKind::AskQuestion,
                OperationKind::GenerateAssignment,
                OperationKind::GenerateQuiz,
            ]
        );
    }

    #[test]
    fn toggle_flips_membership() {
        let mut set = OperationSet::default();
        assert!(set.toggle(OperationKind::GenerateQuiz));
        assert!(set.contains(OperationKind::GenerateQuiz));
        assert!(!set.toggle(OperationKind::GenerateQuiz));
        assert!(set.is_empty());
    }

    #[test]
    fn preconditions_checked_in_order() {
        let none = Submission::new("", OperationSet::default());
        assert_eq!(check_preconditions(false, false, &none), Some(Guidance::NoDocument));
        assert_eq!(check_preconditions(true, false, &none), Some(Guidance::NoCredential));
        assert_eq!(
            check_preconditions(true, true, &none),
            Some(Guidance::NoOperationSelected)
        );
    }

    #[test]
    fn ask_needs_a_query_but_quiz_does_not() {
        let ask = Submission::new("   ", OperationSet::only(OperationKind::AskQuestion));
        assert_eq!(check_preconditions(true, true, &ask), Some(Guidance::MissingQuery));

        let quiz = Submission::new("", OperationSet::only(OperationKind::GenerateQuiz));
        assert_eq!(check_preconditions(true, true, &quiz), None);
    }

    #[test]
    fn operation_kind_serialises_snake_case() {
        let json = serde_json::to_string(&OperationKind::GenerateQuiz).unwrap();
        assert_eq!(json, "\"generate_quiz\"");
    }

    #[test]
    fn no_document_message_points_at_cli_input() {
        let msg = Guidance::NoDocument.message();
        assert!(msg.contains("INPUT") && msg.contains("SEMESTER_INPUT"));
        assert!(!msg.contains("sidebar"));
    }
}
