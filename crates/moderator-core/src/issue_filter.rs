use std::collections::HashSet;

/// Normalize issue label names for case-insensitive matching.
pub fn normalize_issue_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Build the normalized set of labels from configuration values.
pub fn build_issue_label_set<'a>(labels: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    labels
        .into_iter()
        .map(normalize_issue_label)
        .filter(|label| !label.is_empty())
        .collect::<HashSet<_>>()
}

/// Return true when any issue label is in `wanted`. An empty `wanted` set matches nothing.
pub fn issue_has_any_label<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    wanted: &HashSet<String>,
) -> bool {
    if wanted.is_empty() {
        return false;
    }
    labels
        .into_iter()
        .map(normalize_issue_label)
        .any(|label| wanted.contains(&label))
}

/// Return true when the configured ignore label is present on the issue.
pub fn issue_is_ignored<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    ignore_label: Option<&str>,
) -> bool {
    let Some(ignore_label) = ignore_label
        .map(normalize_issue_label)
        .filter(|label| !label.is_empty())
    else {
        return false;
    };
    labels
        .into_iter()
        .any(|label| normalize_issue_label(label) == ignore_label)
}
