//! Matching a requested URL against an external catalog of known resources.

use serde::{Deserialize, Serialize};

use crate::text_normalize::canonicalize_url;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Public struct `CatalogSource` parsed from the catalog JSON.
pub struct CatalogSource {
    /// One URL, or several joined with commas.
    #[serde(rename = "baseUrl")]
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Public struct `CatalogEntry` parsed from the catalog JSON.
pub struct CatalogEntry {
    pub name: String,
    #[serde(rename = "lang")]
    pub language_code: String,
    #[serde(default)]
    pub sources: Vec<CatalogSource>,
}

impl CatalogEntry {
    /// Canonical form of every URL listed by this entry's sources.
    pub fn canonical_source_urls(&self) -> impl Iterator<Item = String> + '_ {
        self.sources.iter().flat_map(|source| {
            source
                .base_url
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(canonicalize_url)
        })
    }

    /// Entry name with an optional vendor prefix removed. Whitespace left
    /// between the prefix and the name is dropped, so `"Vendor:"` and
    /// `"Vendor: "` strip the same way.
    pub fn display_name(&self, strip_prefix: Option<&str>) -> String {
        match strip_prefix.map(str::trim).filter(|prefix| !prefix.is_empty()) {
            Some(prefix) => self.name.replacen(prefix, "", 1).trim_start().to_string(),
            None => self.name.clone(),
        }
    }
}

pub type Catalog = Vec<CatalogEntry>;

/// First catalog entry (in catalog order) with a source URL canonically equal to `request_url`.
pub fn find_existing<'a>(request_url: &str, catalog: &'a [CatalogEntry]) -> Option<&'a CatalogEntry> {
    let request = canonicalize_url(request_url);
    if request.is_empty() {
        return None;
    }
    catalog
        .iter()
        .find(|entry| entry.canonical_source_urls().any(|url| url == request))
}

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("all", "All"),
    ("other", "Other"),
    ("multi", "Multiple languages"),
    ("ar", "Arabic"),
    ("bg", "Bulgarian"),
    ("bn", "Bangla"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("es-419", "Latin American Spanish"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fil", "Filipino"),
    ("fr", "French"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ms", "Malay"),
    ("my", "Burmese"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("pt-br", "Brazilian Portuguese"),
    ("pt-pt", "European Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
    ("zh-hans", "Simplified Chinese"),
    ("zh-hant", "Traditional Chinese"),
];

/// English display name for a catalog language code; unknown codes echo back.
pub fn language_display_name(code: &str) -> String {
    let normalized = code.trim().to_ascii_lowercase();
    LANGUAGE_NAMES
        .iter()
        .find(|(known, _)| *known == normalized)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| code.trim().to_string())
}
