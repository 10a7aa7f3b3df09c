use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::text_normalize::canonicalize_url;

/// Hosting-platform and user-content domains that never identify a requested resource.
pub const DEFAULT_EXCLUDED_DOMAINS: &[&str] = &[
    "github.com",
    "gist.github.com",
    "user-images.githubusercontent.com",
    "private-user-images.githubusercontent.com",
];
/// Host-shaped tokens ending in these are file names (screenshots, docs), not sites.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[".md", ".png", ".jpg", ".jpeg", ".gif", ".webp"];

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:https?://)?(?:[-a-z0-9_]+\.)+[a-z]{2,18}/?")
            .expect("url pattern is a valid regex")
    })
}

#[derive(Debug, Clone)]
/// Extracts canonical candidate resource URLs from free text.
pub struct UrlExtractor {
    excluded_domains: HashSet<String>,
    excluded_extensions: Vec<String>,
}

impl Default for UrlExtractor {
    fn default() -> Self {
        Self {
            excluded_domains: DEFAULT_EXCLUDED_DOMAINS
                .iter()
                .map(|domain| canonicalize_url(domain))
                .collect(),
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|extension| extension.to_string())
                .collect(),
        }
    }
}

impl UrlExtractor {
    /// Extend the domain denylist; entries are canonicalized and blanks ignored.
    pub fn with_excluded_domains<'a>(mut self, domains: impl IntoIterator<Item = &'a str>) -> Self {
        self.excluded_domains.extend(
            domains
                .into_iter()
                .map(canonicalize_url)
                .filter(|domain| !domain.is_empty()),
        );
        self
    }

    pub fn is_excluded(&self, canonical: &str) -> bool {
        self.excluded_domains.contains(canonical)
            || self
                .excluded_extensions
                .iter()
                .any(|extension| canonical.ends_with(extension.as_str()))
    }

    /// Distinct canonical URLs in order of first occurrence. An empty result
    /// means there is nothing to compare.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut urls = Vec::new();
        let mut seen = HashSet::new();
        for found in url_pattern().find_iter(text) {
            let canonical = canonicalize_url(found.as_str());
            if canonical.is_empty() || self.is_excluded(&canonical) {
                continue;
            }
            if seen.insert(canonical.clone()) {
                urls.push(canonical);
            }
        }
        urls
    }
}

/// Extract with the default denylists.
pub fn extract_urls(text: &str) -> Vec<String> {
    UrlExtractor::default().extract(text)
}
