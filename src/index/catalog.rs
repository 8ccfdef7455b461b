//! Parser for the `GUTINDEX.ALL` catalog file.
//!
//! The catalog is a formatted-for-humans text file. After a free-form
//! preamble it lists one ebook per title line, number last:
//!
//! ```text
//! TITLE and AUTHOR                                                 ETEXT NO.
//!
//! The Example Book, by A. Writer                                       12345
//!  [Subtitle: An example]
//!  [Language: English]
//! ```
//!
//! Indented bracket lines attach attributes to the most recent ebook number.
//! Only the language attribute is extracted; everything else is skipped.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// First line of the entry listing. Everything before it is preamble.
const HEADER_SENTINEL: &str = "TITLE and AUTHOR";

/// Terminator line. Everything after it is boilerplate notes.
const FOOTER_SENTINEL: &str = "<==End of GUTINDEX.ALL";

#[allow(clippy::expect_used)]
static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Language: (\w+)\]").expect("language attribute regex is valid"));

/// Parsed catalog: titles and languages keyed by ebook number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    /// Ebook number to title. Later entries for the same number win.
    pub titles: BTreeMap<u32, String>,
    /// Ebook number to language, for entries carrying a language attribute.
    pub languages: BTreeMap<u32, String>,
    /// Count of entry lines that did not yield an ebook number.
    pub skipped_lines: usize,
}

impl CatalogIndex {
    /// Number of catalog entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Returns `true` when no entries were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

enum CatalogState {
    Preamble,
    Scanning,
}

/// Parses `GUTINDEX.ALL` text into a [`CatalogIndex`].
///
/// Malformed entry lines are counted and skipped without aborting the parse;
/// the catalog has carried such lines for years and a single bad line must
/// not cost the whole index.
#[must_use]
pub fn parse_catalog(text: &str) -> CatalogIndex {
    let mut index = CatalogIndex::default();
    let mut state = CatalogState::Preamble;
    let mut current_id: Option<u32> = None;

    for raw_line in text.lines() {
        // The catalog aligns columns with non-breaking spaces in places.
        let line = raw_line.replace('\u{a0}', " ");
        let line = line.trim_end();

        match state {
            CatalogState::Preamble => {
                if line.contains(HEADER_SENTINEL) {
                    state = CatalogState::Scanning;
                }
            }
            CatalogState::Scanning => {
                if line.starts_with(FOOTER_SENTINEL) {
                    break;
                }
                if line.is_empty() {
                    continue;
                }
                if line.starts_with(' ') || line.starts_with('\t') || line.starts_with('[') {
                    record_language(line, current_id, &mut index);
                    continue;
                }
                match parse_title_line(line) {
                    Some((title, id)) => {
                        index.titles.insert(id, title);
                        current_id = Some(id);
                    }
                    None => {
                        debug!(line, "skipping malformed catalog entry line");
                        index.skipped_lines += 1;
                    }
                }
            }
        }
    }

    index
}

fn record_language(line: &str, current_id: Option<u32>, index: &mut CatalogIndex) {
    let Some(id) = current_id else {
        return;
    };
    if let Some(captures) = LANGUAGE_RE.captures(line) {
        index.languages.insert(id, captures[1].to_string());
    }
}

/// Splits a title line into `(title, ebook number)` at the last whitespace.
/// Numbers may carry a single `B` or `C` audiobook/copyright marker suffix.
fn parse_title_line(line: &str) -> Option<(String, u32)> {
    let line = line.trim();
    let (title, token) = line.rsplit_once(char::is_whitespace)?;
    let token = token.strip_suffix(['B', 'C']).unwrap_or(token);
    let id = token.parse::<u32>().ok()?;
    Some((title.trim_end().to_string(), id))
}
