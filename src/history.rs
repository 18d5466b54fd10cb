//! Interaction records and the newest-first conversation log.

use crate::operation::OperationKind;
use serde::{Deserialize, Serialize};

/// One logged `(label, response)` pair.
///
/// Fields are private so a record cannot change after it is logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    kind: OperationKind,
    label: String,
    response: String,
}

impl InteractionRecord {
    /// Build a record, deriving the label from `kind` and `query`.
    pub fn new(kind: OperationKind, query: &str, response: impl Into<String>) -> Self {
        Self {
            kind,
            label: kind.label(query),
            response: response.into(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn response(&self) -> &str {
        &self.response
    }
}

/// Session-lifetime history; position 0 is always the most recent record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationLog {
    records: Vec<InteractionRecord>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` at the front.
    pub fn append(&mut self, record: InteractionRecord) {
        self.records.insert(0, record);
    }

    /// All records, newest first.
    pub fn all(&self) -> &[InteractionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&InteractionRecord> {
        self.records.first()
    }

    /// Record at `index` (0 = newest).
    pub fn get(&self, index: usize) -> Option<&InteractionRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InteractionRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a ConversationLog {
    type Item = &'a InteractionRecord;
    type IntoIter = std::slice::Iter<'a, InteractionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize) -> InteractionRecord {
        InteractionRecord::new(OperationKind::AskQuestion, &format!("q{n}"), format!("a{n}"))
    }

    #[test]
    fn append_puts_newest_first() {
        let mut log = ConversationLog::new();
        for n in 1..=4 {
            log.append(record(n));
        }
        assert_eq!(log.len(), 4);
        let labels: Vec<&str> = log.iter().map(|r| r.label()).collect();
        assert_eq!(
            labels,
            vec![
                "[Ask a Question] q4",
                "[Ask a Question] q3",
                "[Ask a Question] q2",
                "[Ask a Question] q1",
            ]
        );
        assert_eq!(log.latest().map(|r| r.response()), Some("a4"));
    }

    #[test]
    fn empty_log() {
        let log = ConversationLog::new();
        assert!(log.is_empty());
        assert!(log.latest().is_none());
        assert!(log.get(0).is_none());
        assert!(log.all().is_empty());
    }

    #[test]
    fn record_serialises_with_kind_and_label() {
        let r = InteractionRecord::new(OperationKind::GenerateQuiz, "", "Q1 ...");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["kind"], "generate_quiz");
        assert_eq!(v["label"], "[Quiz]");
        assert_eq!(v["response"], "Q1 ...");
    }
}
