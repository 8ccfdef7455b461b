//! Best-effort charset handling for raw book text.
//!
//! Archive contents span decades of digitization: UTF-8, Latin-1,
//! Windows-1252 and stranger things, sometimes mixed within one file.
//! Decoding is therefore done line by line: valid UTF-8 passes through
//! untouched, anything else goes through statistical detection.

use std::borrow::Cow;

use chardetng::EncodingDetector;
use tracing::trace;

/// Decodes one raw line of book text.
///
/// Valid UTF-8 is borrowed as-is. Other bytes are fed to a fresh detector
/// and decoded with its guess; undecodable bytes become replacement
/// characters rather than failing the book.
#[must_use]
pub fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            let encoding = detector.guess(None, true);
            let (decoded, _, had_errors) = encoding.decode(bytes);
            trace!(
                encoding = encoding.name(),
                had_errors,
                "decoded line via detected charset"
            );
            decoded
        }
    }
}
