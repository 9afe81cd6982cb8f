//! Best-effort, lossy text normalization.
//!
//! Inputs arrive as page markup, plain text, or OCR output. The contract is
//! deliberately forgiving: malformed markup falls back silently to plain-text
//! treatment, nothing in this path is fatal.

use std::io::Cursor;

/// Render width handed to html2text; normalization collapses line breaks
/// anyway, so the value only needs to avoid pathological wrapping.
const HTML_RENDER_WIDTH: usize = 200;

/// Normalize raw source text into a single whitespace-collapsed line.
///
/// If the input contains both an opening and closing angle bracket it is
/// treated as markup: script/style-equivalent blocks are removed and the body
/// text extracted. Anything that fails along the way degrades to treating the
/// whole input as plain text.
pub fn normalize(raw: &str) -> String {
    if raw.contains('<') && raw.contains('>') {
        if let Some(text) = markup_to_text(raw) {
            return collapse_ws(&text);
        }
    }
    collapse_ws(raw)
}

/// Collapse all whitespace runs (including newlines) to single spaces and
/// trim the ends. Also used by the OCR orchestrator on reassembled text.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn has_any_text(s: &str) -> bool {
    s.chars().any(|c| !c.is_whitespace())
}

fn markup_to_text(html: &str) -> Option<String> {
    // Strip script/style/noscript first so JS and CSS never count as content.
    let html = strip_markup_blocks(html, "script");
    let html = strip_markup_blocks(&html, "style");
    let html = strip_markup_blocks(&html, "noscript");

    // Prefer DOM body text; it drops tags without rendering artifacts.
    if let Ok(sel) = html_scraper::Selector::parse("body") {
        let doc = html_scraper::Html::parse_document(&html);
        if let Some(body) = doc.select(&sel).next() {
            let text = body.text().collect::<Vec<_>>().join(" ");
            if has_any_text(&text) {
                return Some(text);
            }
        }
    }

    // Fragment without a body, or a parse that produced nothing: render it.
    let rendered = html2text::from_read(Cursor::new(html.as_bytes()), HTML_RENDER_WIDTH).ok()?;
    has_any_text(&rendered).then_some(rendered)
}

/// Remove `<tag ...>...</tag>` blocks, ASCII-case-insensitive on the tag name.
///
/// Conservative: a block is only removed when its close tag is found; an
/// unterminated block leaves the remainder untouched.
fn strip_markup_blocks(html: &str, tag: &str) -> String {
    let open_pat = format!("<{tag}");
    let close_pat = format!("</{tag}>");
    let lower = html.to_ascii_lowercase();

    let mut out = String::with_capacity(html.len());
    let mut i = 0usize;
    while let Some(rel) = lower[i..].find(&open_pat) {
        let start = i + rel;
        let after_open = start + open_pat.len();
        match lower[after_open..].find(&close_pat) {
            Some(rel_end) => {
                out.push_str(&html[i..start]);
                i = after_open + rel_end + close_pat.len();
            }
            None => break,
        }
    }
    out.push_str(&html[i..]);
    out
}
