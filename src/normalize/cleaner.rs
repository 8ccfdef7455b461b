//! Boilerplate stripping and paragraph reflow for raw book text.
//!
//! Raw texts carry a legal preamble, the body, and a trailing license
//! block. The body sits between a start marker (`*** START OF ...`, or the
//! `*END THE SMALL PRINT!` sentinel in older files) and an end marker
//! (`*** END OF ...`). Everything outside the markers is discarded, hard
//! line wraps inside a paragraph are undone, and credit/license paragraphs
//! that leak inside the markers are dropped by prefix.

use super::encoding::decode_line;

const START_MARKERS: [&str; 2] = ["*** START", "***START"];
const END_MARKERS: [&str; 2] = ["*** END", "***END"];

/// Pre-2002 files close their legal preamble with this line instead of a
/// start marker.
const SMALL_PRINT_SENTINEL: &str = "*END THE SMALL PRINT!";

/// Cleaned body text: reflowed paragraphs plus marker diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedText {
    /// Body paragraphs in order, each a single unwrapped line.
    pub paragraphs: Vec<String>,
    /// Whether a start marker was found.
    pub start_seen: bool,
    /// Whether an end marker was found.
    pub end_seen: bool,
}

enum CleanState {
    SeekingStart,
    Collecting,
    Done,
}

/// Extracts the cleaned body from raw book bytes.
///
/// Missing markers are reported on the result but never fail the book; a
/// file without a start marker simply yields no paragraphs.
#[must_use]
pub fn clean_text(raw: &[u8], boilerplate_prefixes: &[String]) -> CleanedText {
    let mut result = CleanedText::default();
    let mut state = CleanState::SeekingStart;
    let mut paragraph = String::new();

    for raw_line in raw.split(|&b| b == b'\n') {
        let line = decode_line(raw_line.trim_ascii());
        match state {
            CleanState::SeekingStart => {
                if is_start_marker(&line) {
                    result.start_seen = true;
                    state = CleanState::Collecting;
                }
            }
            CleanState::Collecting => {
                if is_end_marker(&line) {
                    result.end_seen = true;
                    state = CleanState::Done;
                } else if line.is_empty() {
                    flush_paragraph(&mut paragraph, boilerplate_prefixes, &mut result.paragraphs);
                } else {
                    paragraph.push(' ');
                    paragraph.push_str(&line);
                }
            }
            CleanState::Done => break,
        }
    }

    result
}

fn is_start_marker(line: &str) -> bool {
    START_MARKERS.iter().any(|marker| line.contains(marker))
        || line.starts_with(SMALL_PRINT_SENTINEL)
}

fn is_end_marker(line: &str) -> bool {
    END_MARKERS.iter().any(|marker| line.contains(marker))
}

fn flush_paragraph(paragraph: &mut String, boilerplate_prefixes: &[String], out: &mut Vec<String>) {
    let trimmed = paragraph.trim();
    if !trimmed.is_empty()
        && !boilerplate_prefixes
            .iter()
            .any(|prefix| trimmed.starts_with(prefix.as_str()))
    {
        out.push(trimmed.to_string());
    }
    paragraph.clear();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn default_prefixes() -> Vec<String> {
        vec![
            "Produced by".to_string(),
            "End of the Project Gutenberg".to_string(),
            "End of Project Gutenberg".to_string(),
        ]
    }

    const SAMPLE_TEXT: &[u8] = b"\
The Example Book

This header material must never appear in output.

*** START OF THE PROJECT GUTENBERG EBOOK THE EXAMPLE BOOK ***

Produced by Jane Doe and the Online Distributed
Proofreading Team

It was a dark and stormy night; the rain
fell in torrents.

In a hole in the ground there lived
a hobbit.

*** END OF THE PROJECT GUTENBERG EBOOK THE EXAMPLE BOOK ***

End matter that must never appear either.
";

    // ==================== Marker Tests ====================

    #[test]
    fn test_clean_text_keeps_only_body() {
        let cleaned = clean_text(SAMPLE_TEXT, &default_prefixes());
        assert!(cleaned.start_seen);
        assert!(cleaned.end_seen);
        assert_eq!(
            cleaned.paragraphs,
            vec![
                "It was a dark and stormy night; the rain fell in torrents.",
                "In a hole in the ground there lived a hobbit.",
            ]
        );
    }

    #[test]
    fn test_clean_text_compact_marker_variant() {
        let raw = b"***START OF THIS EBOOK***\n\nBody text.\n\n***END OF THIS EBOOK***\n";
        let cleaned = clean_text(raw, &default_prefixes());
        assert!(cleaned.start_seen);
        assert!(cleaned.end_seen);
        assert_eq!(cleaned.paragraphs, vec!["Body text."]);
    }

    #[test]
    fn test_clean_text_small_print_sentinel_starts_body() {
        let raw = b"\
Legal preamble here.

*END THE SMALL PRINT! FOR PUBLIC DOMAIN EBOOKS*

Actual body text.

*** END ***
";
        let cleaned = clean_text(raw, &default_prefixes());
        assert!(cleaned.start_seen);
        assert_eq!(cleaned.paragraphs, vec!["Actual body text."]);
    }

    #[test]
    fn test_clean_text_without_start_marker_is_empty() {
        let raw = b"Just some text.\n\nNo markers anywhere.\n";
        let cleaned = clean_text(raw, &default_prefixes());
        assert!(!cleaned.start_seen);
        assert!(!cleaned.end_seen);
        assert!(cleaned.paragraphs.is_empty());
    }

    #[test]
    fn test_clean_text_without_end_marker_collects_to_eof() {
        let raw = b"*** START ***\n\nFirst paragraph.\n\nSecond paragraph.\n\n";
        let cleaned = clean_text(raw, &default_prefixes());
        assert!(cleaned.start_seen);
        assert!(!cleaned.end_seen);
        assert_eq!(cleaned.paragraphs, vec!["First paragraph.", "Second paragraph."]);
    }

    #[test]
    fn test_clean_text_end_marker_discards_pending_partial() {
        let raw = b"*** START ***\n\nComplete paragraph.\n\nDangling line\n*** END ***\n";
        let cleaned = clean_text(raw, &default_prefixes());
        assert_eq!(cleaned.paragraphs, vec!["Complete paragraph."]);
    }

    // ==================== Reflow Tests ====================

    #[test]
    fn test_clean_text_joins_wrapped_lines_with_single_space() {
        let raw = b"*** START ***\n\nline one\nline two\nline three\n\n*** END ***\n";
        let cleaned = clean_text(raw, &default_prefixes());
        assert_eq!(cleaned.paragraphs, vec!["line one line two line three"]);
    }

    #[test]
    fn test_clean_text_handles_crlf_line_endings() {
        let raw = b"*** START ***\r\n\r\nline one\r\nline two\r\n\r\n*** END ***\r\n";
        let cleaned = clean_text(raw, &default_prefixes());
        assert_eq!(cleaned.paragraphs, vec!["line one line two"]);
    }

    #[test]
    fn test_clean_text_collapses_repeated_blank_lines() {
        let raw = b"*** START ***\n\n\n\nOnly paragraph.\n\n\n\n*** END ***\n";
        let cleaned = clean_text(raw, &default_prefixes());
        assert_eq!(cleaned.paragraphs, vec!["Only paragraph."]);
    }

    #[test]
    fn test_clean_text_indented_lines_are_trimmed_before_joining() {
        let raw = b"*** START ***\n\n   indented one\n\tindented two\n\n*** END ***\n";
        let cleaned = clean_text(raw, &default_prefixes());
        assert_eq!(cleaned.paragraphs, vec!["indented one indented two"]);
    }

    // ==================== Boilerplate Tests ====================

    #[test]
    fn test_clean_text_drops_produced_by_paragraph() {
        let cleaned = clean_text(SAMPLE_TEXT, &default_prefixes());
        assert!(!cleaned.paragraphs.iter().any(|p| p.contains("Produced by")));
    }

    #[test]
    fn test_clean_text_drops_end_of_project_gutenberg_paragraph() {
        let raw = b"\
*** START ***

Body.

End of the Project Gutenberg EBook of The Example Book

More body.

*** END ***
";
        let cleaned = clean_text(raw, &default_prefixes());
        assert_eq!(cleaned.paragraphs, vec!["Body.", "More body."]);
    }

    #[test]
    fn test_clean_text_prefix_must_be_at_paragraph_start() {
        let raw = b"*** START ***\n\nThe book was Produced by hand.\n\n*** END ***\n";
        let cleaned = clean_text(raw, &default_prefixes());
        assert_eq!(cleaned.paragraphs, vec!["The book was Produced by hand."]);
    }

    // ==================== Encoding Tests ====================

    #[test]
    fn test_clean_text_decodes_mixed_encodings_per_line() {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"*** START ***\n\n");
        raw.extend_from_slice("A valid UTF-8 line with \u{e9}.\n".as_bytes());
        raw.extend_from_slice(b"A Latin-1 line with caf\xe9.\n");
        raw.extend_from_slice(b"\n*** END ***\n");

        let cleaned = clean_text(&raw, &default_prefixes());
        assert_eq!(cleaned.paragraphs.len(), 1);
        let paragraph = &cleaned.paragraphs[0];
        assert!(paragraph.contains("with \u{e9}"), "got: {paragraph}");
        assert!(paragraph.contains("caf\u{e9}"), "got: {paragraph}");
    }
}
