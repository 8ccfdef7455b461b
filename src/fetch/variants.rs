//! Candidate URL derivation for encoding-variant filenames.
//!
//! Ebook archives exist in up to three encodings distinguished only by a
//! filename marker: `12345-0.zip` (UTF-8), `12345-8.zip` (eight-bit) and
//! `12345.zip` (plain ASCII). The directory listing is occasionally stale,
//! so a fetch that 404s is retried against the other variants of the same
//! archive before being declared failed.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static VARIANT_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-[08]").expect("variant marker regex is valid"));

#[allow(clippy::expect_used)]
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?):/+").expect("scheme normalization regex is valid"));

/// Removes every encoding-variant marker from a filename stem.
#[must_use]
pub fn strip_variant_markers(stem: &str) -> String {
    VARIANT_MARKER_RE.replace_all(stem, "").into_owned()
}

/// Filename stem with the extension and variant markers removed.
/// `12345-0.zip`, `12345-8.zip` and `12345.zip` all reduce to `12345`.
#[must_use]
pub fn base_stem(filename: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => filename,
    };
    strip_variant_markers(stem)
}

/// Final path segment of a URL.
#[must_use]
pub fn url_filename(url: &str) -> &str {
    match url.rsplit_once('/') {
        Some((_, name)) => name,
        None => url,
    }
}

/// Rewrites the filename at the end of `url` to the given variant suffix.
///
/// Existing markers are stripped from the stem first, so the rewrite is
/// idempotent and any variant can be derived from any other. The scheme
/// separator is re-collapsed afterwards in case upstream path joining
/// doubled a slash.
#[must_use]
pub fn variant_url(url: &str, suffix: &str) -> String {
    let (base, filename) = match url.rsplit_once('/') {
        Some((base, filename)) => (base, filename),
        None => ("", url),
    };
    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (filename, None),
    };
    let stem = strip_variant_markers(stem);
    let filename = match ext {
        Some(ext) => format!("{stem}{suffix}.{ext}"),
        None => format!("{stem}{suffix}"),
    };
    let joined = if base.is_empty() {
        filename
    } else {
        format!("{base}/{filename}")
    };
    SCHEME_RE.replace_all(&joined, "$1://").into_owned()
}

/// Candidate URLs for one archive: the listed URL first, then each variant
/// suffix in configured order, with exact duplicates dropped.
#[must_use]
pub fn candidate_urls(primary: &str, suffixes: &[String]) -> Vec<String> {
    let mut candidates = vec![primary.to_string()];
    for suffix in suffixes {
        let candidate = variant_url(primary, suffix);
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn default_suffixes() -> Vec<String> {
        vec![String::new(), "-0".to_string(), "-8".to_string()]
    }

    // ==================== Variant URL Tests ====================

    #[test]
    fn test_variant_url_replaces_existing_marker() {
        assert_eq!(
            variant_url("http://m.example/1/0/0/100/100-0.zip", "-8"),
            "http://m.example/1/0/0/100/100-8.zip"
        );
    }

    #[test]
    fn test_variant_url_empty_suffix_strips_marker() {
        assert_eq!(
            variant_url("http://m.example/1/0/0/100/100-0.zip", ""),
            "http://m.example/1/0/0/100/100.zip"
        );
    }

    #[test]
    fn test_variant_url_adds_marker_to_plain_filename() {
        assert_eq!(
            variant_url("http://m.example/1/0/0/100/100.zip", "-0"),
            "http://m.example/1/0/0/100/100-0.zip"
        );
    }

    #[test]
    fn test_variant_url_strips_repeated_markers() {
        assert_eq!(
            variant_url("http://m.example/a/123-0-8.zip", ""),
            "http://m.example/a/123.zip"
        );
    }

    #[test]
    fn test_variant_url_without_extension() {
        assert_eq!(variant_url("http://m.example/a/123-0", "-8"), "http://m.example/a/123-8");
    }

    #[test]
    fn test_variant_url_collapses_doubled_scheme_slashes() {
        assert_eq!(
            variant_url("http:////m.example/a/123.zip", ""),
            "http://m.example/a/123.zip"
        );
    }

    #[test]
    fn test_variant_url_keeps_directory_path_untouched() {
        // Directory names can carry digits; only the filename is rewritten.
        assert_eq!(
            variant_url("http://m.example/1-0/200-0.zip", "-8"),
            "http://m.example/1-0/200-8.zip"
        );
    }

    // ==================== Candidate Order Tests ====================

    #[test]
    fn test_candidate_urls_for_utf8_primary() {
        let candidates =
            candidate_urls("http://m.example/1/0/0/100/100-0.zip", &default_suffixes());
        assert_eq!(
            candidates,
            vec![
                "http://m.example/1/0/0/100/100-0.zip",
                "http://m.example/1/0/0/100/100.zip",
                "http://m.example/1/0/0/100/100-8.zip",
            ]
        );
    }

    #[test]
    fn test_candidate_urls_for_plain_primary() {
        let candidates = candidate_urls("http://m.example/1/0/0/100/100.zip", &default_suffixes());
        assert_eq!(
            candidates,
            vec![
                "http://m.example/1/0/0/100/100.zip",
                "http://m.example/1/0/0/100/100-0.zip",
                "http://m.example/1/0/0/100/100-8.zip",
            ]
        );
    }

    #[test]
    fn test_candidate_urls_for_eight_bit_primary() {
        let candidates =
            candidate_urls("http://m.example/1/0/0/100/100-8.zip", &default_suffixes());
        assert_eq!(
            candidates,
            vec![
                "http://m.example/1/0/0/100/100-8.zip",
                "http://m.example/1/0/0/100/100.zip",
                "http://m.example/1/0/0/100/100-0.zip",
            ]
        );
    }

    #[test]
    fn test_candidate_urls_without_suffixes_is_primary_only() {
        let candidates = candidate_urls("http://m.example/a/9.zip", &[]);
        assert_eq!(candidates, vec!["http://m.example/a/9.zip"]);
    }

    // ==================== Stem Helper Tests ====================

    #[test]
    fn test_base_stem_reduces_all_variants_to_same_stem() {
        assert_eq!(base_stem("12345-0.zip"), "12345");
        assert_eq!(base_stem("12345-8.zip"), "12345");
        assert_eq!(base_stem("12345.zip"), "12345");
        assert_eq!(base_stem("12345-0.txt"), "12345");
    }

    #[test]
    fn test_base_stem_without_extension() {
        assert_eq!(base_stem("12345-0"), "12345");
    }

    #[test]
    fn test_url_filename_extracts_last_segment() {
        assert_eq!(url_filename("http://m.example/1/0/0/100/100-0.zip"), "100-0.zip");
        assert_eq!(url_filename("100-0.zip"), "100-0.zip");
    }
}
