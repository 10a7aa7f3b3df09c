//! Text canonicalization used by rule matching and URL identity checks.

use unicode_normalization::UnicodeNormalization;

const SCHEME_PREFIXES: [&str; 2] = ["https://", "http://"];
const WWW_PREFIX: &str = "www.";

/// Decompose `text` (NFD) and drop combining diacritical marks U+0300..=U+036F.
pub fn normalize_for_match(text: &str) -> String {
    text.nfd()
        .filter(|ch| !('\u{0300}'..='\u{036F}').contains(ch))
        .collect()
}

/// Canonical identity form of a URL: lower-case, no scheme, no leading
/// `www.`, no trailing slash. Path, query and fragment are only case-folded.
/// Whitespace uncovered by stripping is removed too, so the result is a
/// fixed point.
pub fn canonicalize_url(url: &str) -> String {
    let lowered = url.to_lowercase();
    let mut rest = lowered.trim();
    loop {
        let stripped = SCHEME_PREFIXES
            .iter()
            .find_map(|prefix| rest.strip_prefix(prefix))
            .or_else(|| rest.strip_prefix(WWW_PREFIX));
        match stripped {
            Some(next) => rest = next.trim_start(),
            None => break,
        }
    }
    rest.trim_end_matches(|ch: char| ch == '/' || ch.is_whitespace())
        .to_string()
}
