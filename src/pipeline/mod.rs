//! Pipeline stages for answering against a semester outline.
//!
//! Each submodule implements exactly one transformation step and is
//! testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ (prompts) ──▶ llm ──▶ normalize ──▶ export
//! (path/URL)  (lopdf)                 (Gemini)  (whitespace)  (PDF/txt)
//! ```
//!
//! 1. [`input`]     — read a local file or download a URL into memory
//! 2. [`extract`]   — per-page text extraction; runs in `spawn_blocking`
//! 3. [`llm`]       — the completion seam and its Gemini implementation;
//!    the only stage with network I/O besides URL input
//! 4. [`normalize`] — deterministic whitespace cleanup of model output
//! 5. [`export`]    — fixed-font paginated PDF writer

pub mod export;
pub mod extract;
pub mod input;
pub mod llm;
pub mod normalize;
