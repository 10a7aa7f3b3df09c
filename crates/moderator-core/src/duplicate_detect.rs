use std::collections::HashSet;

use crate::issue_snapshot::IssueSnapshot;
use crate::url_extract::UrlExtractor;

/// Flatten per-label candidate queries in query order, keeping the first
/// occurrence of each issue number.
pub fn merge_candidate_groups(groups: Vec<Vec<IssueSnapshot>>) -> Vec<IssueSnapshot> {
    let mut seen = HashSet::new();
    groups
        .into_iter()
        .flatten()
        .filter(|issue| seen.insert(issue.number))
        .collect()
}

/// Numbers of candidate issues (other than the subject) whose body shares at
/// least one canonical URL with `subject_urls`, in candidate order.
pub fn find_duplicates(
    subject_urls: &[String],
    subject_issue_number: u64,
    candidates: &[IssueSnapshot],
    extractor: &UrlExtractor,
) -> Vec<u64> {
    if subject_urls.is_empty() {
        return Vec::new();
    }
    let subject = subject_urls.iter().map(String::as_str).collect::<HashSet<_>>();
    let mut duplicates = Vec::new();
    for candidate in candidates {
        if candidate.number == subject_issue_number || duplicates.contains(&candidate.number) {
            continue;
        }
        let overlaps = extractor
            .extract(&candidate.body)
            .iter()
            .any(|url| subject.contains(url.as_str()));
        if overlaps {
            duplicates.push(candidate.number);
        }
    }
    duplicates
}
