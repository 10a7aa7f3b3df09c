/// Replace `{name}` placeholders with the supplied values in a single pass.
///
/// Only the names in `values` are substituted; any other brace text is kept
/// verbatim, and substituted values are never re-scanned.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let replacement = after_open.find('}').and_then(|close| {
            let name = &after_open[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match replacement {
            Some((value, close)) => {
                rendered.push_str(value);
                rest = &after_open[close + 1..];
            }
            None => {
                rendered.push('{');
                rest = after_open;
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

/// Join `#n` references as `#1, #2 and #3`.
pub fn join_issue_references(numbers: &[u64]) -> String {
    let references = numbers
        .iter()
        .map(|number| format!("#{number}"))
        .collect::<Vec<_>>();
    match references.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, head)) => format!("{} and {last}", head.join(", ")),
    }
}
