//! PDF export: normalised response text → paginated single-column PDF.
//!
//! ## Layout
//!
//! Every source line becomes one or more fixed-height cells set in the
//! standard Courier font. Lines wider than the printable width wrap at
//! spaces, and a word that alone is too wide is broken hard. A new page
//! starts when the next cell would cross the bottom margin. Markup-looking
//! text (`**bold**`, `# Heading`) is written verbatim.
//!
//! ## Encoding
//!
//! Courier is one of the standard 14 fonts and is referenced with
//! `WinAnsiEncoding`, so no font program is embedded. The repertoire is
//! printable Latin-1. Characters outside it are handled according to
//! [`EncodingPolicy`]: rejected, transliterated (curly quotes, dashes,
//! arrows…) or replaced with `?`.

use crate::config::{EncodingPolicy, ExportConfig};
use crate::error::RenderError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Courier advance width as a fraction of the font size.
const COURIER_ADVANCE: f32 = 0.6;

/// Tabs are expanded to this many spaces.
const TAB_WIDTH: usize = 4;

/// Render `text` into PDF bytes.
pub fn render_pdf(text: &str, export: &ExportConfig) -> Result<Vec<u8>, RenderError> {
    let pages = layout_pages(text, export)?;
    let (page_w_mm, page_h_mm) = export.paper.size_mm();
    let font_mm = export.font_size_pt / PT_PER_MM;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        (page_w_mm * PT_PER_MM).into(),
        (page_h_mm * PT_PER_MM).into(),
    ];

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in &pages {
        let mut operations = Vec::new();
        for (row, line) in page.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            // Baseline sits at the vertical centre of the cell, nudged down
            // by 30 % of the font size.
            let cell_top_mm = export.margin_mm + row as f32 * export.line_height_mm;
            let baseline_mm = cell_top_mm + 0.5 * export.line_height_mm + 0.3 * font_mm;
            let x_pt = export.margin_mm * PT_PER_MM;
            let y_pt = (page_h_mm - baseline_mm) * PT_PER_MM;

            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec!["F1".into(), export.font_size_pt.into()],
            ));
            operations.push(Operation::new("Td", vec![x_pt.into(), y_pt.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(latin1_bytes(line))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Serialise(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => media_box.clone(),
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Serialise(e.to_string()))?;
    debug!("Rendered {} page(s), {} bytes", pages.len(), bytes.len());
    Ok(bytes)
}

/// Split `text` into pages of wrapped, encodable lines.
///
/// Always returns at least one page, possibly empty.
pub fn layout_pages(text: &str, export: &ExportConfig) -> Result<Vec<Vec<String>>, RenderError> {
    let max_chars = chars_per_line(export);
    let (_, page_h_mm) = export.paper.size_mm();
    let limit_mm = page_h_mm - export.bottom_margin_mm;

    let mut pages: Vec<Vec<String>> = vec![Vec::new()];
    let mut y_mm = export.margin_mm;

    for (idx, raw) in text.lines().enumerate() {
        let line = encode_line(raw, idx + 1, export.encoding)?;
        for cell in wrap_line(&line, max_chars) {
            let on_page = pages.last().map_or(0, Vec::len);
            if on_page > 0 && y_mm + export.line_height_mm > limit_mm {
                pages.push(Vec::new());
                y_mm = export.margin_mm;
            }
            if let Some(page) = pages.last_mut() {
                page.push(cell);
            }
            y_mm += export.line_height_mm;
        }
    }

    Ok(pages)
}

/// Number of Courier glyphs that fit in the printable width.
pub fn chars_per_line(export: &ExportConfig) -> usize {
    let (page_w_mm, _) = export.paper.size_mm();
    let printable_mm = page_w_mm - 2.0 * export.margin_mm;
    let glyph_mm = COURIER_ADVANCE * export.font_size_pt / PT_PER_MM;
    ((printable_mm / glyph_mm).floor() as usize).max(1)
}

/// Greedy word wrap to at most `max` characters per line.
///
/// Words longer than `max` are split across lines. An empty input yields a
/// single empty line so blank lines keep their vertical space.
pub fn wrap_line(line: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in line.split(' ') {
        let word_len = word.chars().count();
        let needed = if current_len == 0 {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if needed <= max {
            if current_len > 0 {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
            continue;
        }

        if current_len > 0 {
            out.push(std::mem::take(&mut current));
        }

        let chars: Vec<char> = word.chars().collect();
        let mut chunks = chars.chunks(max).peekable();
        while let Some(chunk) = chunks.next() {
            if chunks.peek().is_some() {
                out.push(chunk.iter().collect());
            } else {
                current = chunk.iter().collect();
                current_len = chunk.len();
            }
        }
    }

    out.push(current);
    out
}

/// Map one source line onto the export repertoire.
fn encode_line(line: &str, line_no: usize, policy: EncodingPolicy) -> Result<String, RenderError> {
    let mut out = String::with_capacity(line.len());
    for ch in line.chars() {
        if ch == '\t' {
            out.extend(std::iter::repeat(' ').take(TAB_WIDTH));
        } else if is_encodable(ch) {
            out.push(ch);
        } else if let Some(sub) = transliterate(ch).filter(|_| policy != EncodingPolicy::Strict) {
            out.push_str(sub);
        } else if policy == EncodingPolicy::Replace {
            out.push('?');
        } else {
            return Err(RenderError::UnsupportedCharacter { ch, line: line_no });
        }
    }
    Ok(out)
}

/// Printable Latin-1: ASCII graphic characters, space and U+00A0..=U+00FF.
fn is_encodable(ch: char) -> bool {
    (' '..='~').contains(&ch) || ('\u{A0}'..='\u{FF}').contains(&ch)
}

/// Latin-1 substitutes for typography models commonly emit.
///
/// WinAnsi does have code points for curly quotes, dashes, `…`, `•`, `€` and
/// `™` in 0x80..=0x9F. They are flattened to ASCII on purpose: the encodable
/// repertoire is kept to Latin-1 so the byte written is always the char's own
/// code point, and the text stays searchable as plain ASCII in any reader.
fn transliterate(ch: char) -> Option<&'static str> {
    let sub = match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => "\"",
        '\u{2039}' => "<",
        '\u{203A}' => ">",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2212}' => "-",
        '\u{2014}' | '\u{2015}' => "--",
        '\u{2026}' => "...",
        '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{25CF}' | '\u{25AA}' | '\u{25E6}' => "*",
        '\u{2190}' => "<-",
        '\u{2192}' => "->",
        '\u{2194}' => "<->",
        '\u{21D2}' => "=>",
        '\u{2264}' => "<=",
        '\u{2265}' => ">=",
        '\u{2260}' => "!=",
        '\u{2248}' => "~",
        '\u{2044}' => "/",
        '\u{02C6}' => "^",
        '\u{02DC}' => "~",
        '\u{2122}' => "(TM)",
        '\u{20AC}' => "EUR",
        '\u{2713}' | '\u{2714}' => "v",
        '\u{2002}'..='\u{200A}' | '\u{202F}' | '\u{205F}' => " ",
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => "",
        _ => return None,
    };
    Some(sub)
}

/// Encode an already-validated line as WinAnsi bytes.
fn latin1_bytes(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
