//! Response normalisation: whitespace cleanup of model output.
//!
//! Models pad their answers with stacks of blank lines and runs of spaces
//! used for visual alignment. Three deterministic rules tidy that up without
//! touching content. The function is total and idempotent:
//! `normalize(normalize(x)) == normalize(x)` for every input.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the blank-line rule also sees
//! Windows-style output. Neither whitespace rule can create input for the
//! other, which is what makes a second pass a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules to a raw completion.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Collapse 3+ consecutive newlines to exactly 2
/// 3. Collapse runs of spaces and tabs to a single space
/// 4. Trim leading and trailing whitespace
pub fn normalize(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = collapse_blank_lines(&s);
    let s = collapse_horizontal_whitespace(&s);
    s.trim().to_string()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Collapse blank lines ─────────────────────────────────────────────

static RE_NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_NEWLINE_RUN.replace_all(input, "\n\n").into_owned()
}

// ── Rule 3: Collapse horizontal whitespace ───────────────────────────────────

static RE_HSPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

fn collapse_horizontal_whitespace(input: &str) -> String {
    RE_HSPACE_RUN.replace_all(input, " ").into_owned()
}
