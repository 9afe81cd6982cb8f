//! Document text extraction helpers.
//!
//! The pipeline only consumes `(page_count, extracted_text)` plus a "looks
//! scanned" signal; layout and geometry stay inside the PDF library.

use quotescout_core::{Error, Result};

/// Below this average, a PDF's text layer is assumed to be missing or junk
/// and the document is routed to OCR instead.
pub const SCANNED_AVG_CHARS_PER_PAGE: usize = 500;

/// Extract text from a PDF body (in-memory bytes).
///
/// Extraction quality varies by PDF (text layer vs scanned images); callers
/// should run [`looks_scanned`] on the result before trusting it.
pub fn pdf_to_text(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| Error::Extract(e.to_string()))
}

/// Heuristic "this PDF is a scan" signal: the text layer yields almost
/// nothing per page.
pub fn looks_scanned(text: &str, page_count: usize) -> bool {
    let pages = page_count.max(1);
    text.chars().count() / pages < SCANNED_AVG_CHARS_PER_PAGE
}

/// Best-effort page count from extracted text: pdf text extraction emits a
/// form feed between pages. Callers with a real page count from their parser
/// should prefer it.
pub fn page_count_hint(text: &str) -> usize {
    text.matches('\u{c}').count() + 1
}

/// Best-effort sniff for PDF bytes (magic header).
pub fn bytes_look_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_look_like_pdf_sniffs_magic_header() {
        assert!(bytes_look_like_pdf(b"%PDF-1.7\n%..."));
        assert!(!bytes_look_like_pdf(b"<!doctype html><html>"));
        assert!(!bytes_look_like_pdf(b""));
    }

    #[test]
    fn sparse_text_layer_reads_as_scanned() {
        let text = "Page 1\u{c}Page 2\u{c}Page 3";
        assert!(looks_scanned(text, 3));
    }

    #[test]
    fn dense_text_layer_reads_as_real_text() {
        let page = "word ".repeat(200);
        let text = format!("{page}\u{c}{page}");
        assert!(!looks_scanned(&text, 2));
    }

    #[test]
    fn page_count_hint_counts_form_feeds() {
        assert_eq!(page_count_hint("one\u{c}two\u{c}three"), 3);
        assert_eq!(page_count_hint("single page"), 1);
    }

    #[test]
    fn zero_page_count_does_not_divide_by_zero() {
        assert!(looks_scanned("", 0));
    }

    #[test]
    fn invalid_pdf_bytes_surface_a_typed_extract_error() {
        let err = pdf_to_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, Error::Extract(_)));
    }
}
