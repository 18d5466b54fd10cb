//! Prompt templates for the three operation kinds.
//!
//! Every prompt sent to the generation service is built here from a fixed
//! template, so unit tests can inspect the exact text without a live model.
//! Templates are compile-time constants; there is no runtime override.

use crate::operation::OperationKind;

/// Placeholder replaced with the extracted outline.
const OUTLINE_SLOT: &str = "{outline}";

/// Placeholder replaced with the user's query.
const QUERY_SLOT: &str = "{query}";

/// Question answering: the outline first, then the literal user query.
pub const ASK_TEMPLATE: &str = "Here is the semester outline:\n\n{outline}\n\nNow answer this user query: {query}";

/// Quiz generation: five multiple-choice questions with options A to D and
/// the correct answer marked after each question.
pub const QUIZ_TEMPLATE: &str = "From the following outline, generate 5 multiple-choice questions. \
Provide options (A to D) and mark the correct answer at the end of each question.\n\n\
Outline: {outline}";

/// Assignment generation: a structured brief.
pub const ASSIGNMENT_TEMPLATE: &str = "Based on the following semester outline, generate a detailed \
assignment prompt with title, objectives, tasks and submission guidelines.\n\n\
Outline: {outline}";

/// Template used for `kind`.
pub fn template_for(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::AskQuestion => ASK_TEMPLATE,
        OperationKind::GenerateQuiz => QUIZ_TEMPLATE,
        OperationKind::GenerateAssignment => ASSIGNMENT_TEMPLATE,
    }
}

/// Build the prompt for one operation.
///
/// The query is only interpolated for [`OperationKind::AskQuestion`]; quiz and
/// assignment prompts depend on the outline alone. Slots are filled in a
/// single pass over the template, so braces inside the outline or the query
/// are copied verbatim and never expanded.
pub fn build_prompt(outline: &str, kind: OperationKind, query: &str) -> String {
    let template = template_for(kind);
    let mut out = String::with_capacity(template.len() + outline.len() + query.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix(OUTLINE_SLOT) {
            out.push_str(outline);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(QUERY_SLOT) {
            out.push_str(query);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTLINE: &str = "Course: Algorithms. Topics: sorting, graphs.";

    #[test]
    fn build_is_deterministic() {
        for kind in [
            OperationKind::AskQuestion,
            OperationKind::GenerateQuiz,
            OperationKind::GenerateAssignment,
        ] {
            assert_eq!(
                build_prompt(OUTLINE, kind, "when is the midterm?"),
                build_prompt(OUTLINE, kind, "when is the midterm?")
            );
        }
    }

    #[test]
    fn quiz_prompt_requests_five_questions_a_to_d() {
        let p = build_prompt(OUTLINE, OperationKind::GenerateQuiz, "");
        assert!(p.contains("5 multiple-choice questions"));
        assert!(p.contains("A to D"));
        assert!(p.contains("mark the correct answer"));
        assert!(p.ends_with(OUTLINE));
    }

    #[test]
    fn ask_prompt_places_outline_before_query() {
        let p = build_prompt(OUTLINE, OperationKind::AskQuestion, "What is week 3 about?");
        let outline_at = p.find(OUTLINE).unwrap();
        let query_at = p.find("What is week 3 about?").unwrap();
        assert!(outline_at < query_at);
    }

    #[test]
    fn assignment_prompt_ignores_query() {
        let a = build_prompt(OUTLINE, OperationKind::GenerateAssignment, "graphs");
        let b = build_prompt(OUTLINE, OperationKind::GenerateAssignment, "");
        assert_eq!(a, b);
        assert!(a.contains("title, objectives, tasks"));
    }

    #[test]
    fn placeholders_inside_outline_are_left_alone() {
        let p = build_prompt("Week 1: {query}", OperationKind::AskQuestion, "hi");
        assert!(p.contains("Week 1: {query}"));
        assert!(p.ends_with("hi"));
    }

    #[test]
    fn placeholders_inside_query_are_left_alone() {
        let p = build_prompt("SECRET OUTLINE", OperationKind::AskQuestion, "what does {outline} mean?");
        assert!(p.ends_with("Now answer this user query: what does {outline} mean?"));
        assert_eq!(p.matches("SECRET OUTLINE").count(), 1);

        let p = build_prompt("X", OperationKind::AskQuestion, "{query}");
        assert!(p.ends_with("user query: {query}"));
    }

    #[test]
    fn every_slot_is_filled() {
        for kind in [
            OperationKind::AskQuestion,
            OperationKind::GenerateQuiz,
            OperationKind::GenerateAssignment,
        ] {
            let p = build_prompt(OUTLINE, kind, "q");
            assert!(!p.contains(OUTLINE_SLOT) && !p.contains(QUERY_SLOT), "{kind}: {p}");
        }
    }
}
