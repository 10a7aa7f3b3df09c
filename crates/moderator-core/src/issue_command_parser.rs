use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::issue_snapshot::LockReason;

/// Characters that introduce a bot command when they start a comment.
pub const BOT_PREFIX_CHARS: [char; 3] = ['/', '?', '!'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates supported `CommandKind` values.
pub enum CommandKind {
    Blurb,
    Duplicate,
    Delete,
    EditTitle,
    Lock,
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blurb => "blurb",
            Self::Duplicate => "duplicate",
            Self::Delete => "delete",
            Self::EditTitle => "edit-title",
            Self::Lock => "lock",
        }
    }

    /// Configuration input holding this command's literal trigger.
    pub fn trigger_input_name(&self) -> String {
        format!("{}-command", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Static registration of one command.
pub struct CommandSpec {
    pub kind: CommandKind,
    /// Hide the triggering comment once the handler ran.
    pub minimize_comment: bool,
}

/// Registered commands; the first match in this order wins.
pub const COMMAND_REGISTRY: [CommandSpec; 5] = [
    CommandSpec {
        kind: CommandKind::Blurb,
        minimize_comment: true,
    },
    CommandSpec {
        kind: CommandKind::Duplicate,
        minimize_comment: false,
    },
    CommandSpec {
        kind: CommandKind::Delete,
        minimize_comment: false,
    },
    CommandSpec {
        kind: CommandKind::EditTitle,
        minimize_comment: true,
    },
    CommandSpec {
        kind: CommandKind::Lock,
        minimize_comment: true,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `TriggerKind` values.
pub enum TriggerKind {
    Literal,
    BotPrefix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Public struct `DetectedCommand` returned by [`detect_command`].
pub struct DetectedCommand {
    pub spec: CommandSpec,
    pub trigger: TriggerKind,
}

pub fn starts_with_bot_prefix(body: &str) -> bool {
    body.starts_with(BOT_PREFIX_CHARS)
}

fn matches_bot_prefix(body: &str, name: &str) -> bool {
    let mut chars = body.chars();
    match chars.next() {
        Some(first) if BOT_PREFIX_CHARS.contains(&first) => chars.as_str().starts_with(name),
        _ => false,
    }
}

/// Find the first registered command triggered by `body`.
///
/// `literal_trigger` returns the configured literal prefix for a command, if
/// any; blank triggers never match.
pub fn detect_command<F>(body: &str, literal_trigger: F) -> Option<DetectedCommand>
where
    F: Fn(CommandKind) -> Option<String>,
{
    COMMAND_REGISTRY.iter().find_map(|spec| {
        let literal = literal_trigger(spec.kind)
            .filter(|trigger| !trigger.trim().is_empty())
            .is_some_and(|trigger| body.starts_with(trigger.as_str()));
        if literal {
            return Some(DetectedCommand {
                spec: *spec,
                trigger: TriggerKind::Literal,
            });
        }
        matches_bot_prefix(body, spec.kind.name()).then_some(DetectedCommand {
            spec: *spec,
            trigger: TriggerKind::BotPrefix,
        })
    })
}

fn question_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#\d+\?").expect("question pattern is a valid regex"))
}

/// A plain-text comment such as "dupe of #123?" is a question, not an order.
pub fn is_rhetorical_question(body: &str) -> bool {
    !starts_with_bot_prefix(body) && question_pattern().is_match(body)
}

fn quoted_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""(?:[^"\\]|\\.)*""#).expect("quoted string pattern is a valid regex")
    })
}

/// First double-quoted segment of `body`, with `\"` unescaped and every other
/// backslash escape dropped. Returns `None` when there is no quoted segment.
pub fn parse_quoted_title(body: &str) -> Option<String> {
    let quoted = quoted_pattern().find(body)?.as_str();
    let inner = &quoted[1..quoted.len() - 1];
    let mut title = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            title.push(ch);
            continue;
        }
        if let Some('"') = chars.next() {
            title.push('"');
        }
    }
    Some(title)
}

/// First lock reason, in [`LockReason::ALL`] order, whose keyword appears in `body`.
pub fn lock_reason_from_body(body: &str) -> Option<LockReason> {
    LockReason::ALL
        .into_iter()
        .find(|reason| body.contains(reason.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// One canned reply from the `blurbs` input.
pub struct Blurb {
    pub keywords: Vec<String>,
    pub message: String,
}

pub fn match_blurb<'a>(body: &str, blurbs: &'a [Blurb]) -> Option<&'a Blurb> {
    blurbs.iter().find(|blurb| {
        blurb
            .keywords
            .iter()
            .filter(|keyword| !keyword.is_empty())
            .any(|keyword| body.contains(keyword.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::{
        detect_command, is_rhetorical_question, lock_reason_from_body, match_blurb,
        parse_quoted_title, Blurb, CommandKind, TriggerKind,
    };
    use crate::issue_snapshot::LockReason;

    fn no_literals(_kind: CommandKind) -> Option<String> {
        None
    }

    #[test]
    fn unit_detect_command_matches_bot_prefixed_names() {
        for body in ["/lock off-topic", "?lock", "!lock please"] {
            let detected = detect_command(body, no_literals).expect("detected");
            assert_eq!(detected.spec.kind, CommandKind::Lock);
            assert_eq!(detected.trigger, TriggerKind::BotPrefix);
            assert!(detected.spec.minimize_comment);
        }
        assert!(detect_command("lock this please", no_literals).is_none());
        assert!(detect_command("#lock", no_literals).is_none());
    }

    #[test]
    fn functional_detect_command_uses_literal_triggers_in_registration_order() {
        let literals = |kind: CommandKind| match kind {
            CommandKind::Duplicate => Some("Duplicate of".to_string()),
            CommandKind::Blurb => Some("   ".to_string()),
            _ => None,
        };
        let detected = detect_command("Duplicate of #12", literals).expect("detected");
        assert_eq!(detected.spec.kind, CommandKind::Duplicate);
        assert_eq!(detected.trigger, TriggerKind::Literal);
        assert!(!detected.spec.minimize_comment);

        assert!(detect_command("anything else", literals).is_none());
    }

    #[test]
    fn integration_detect_command_prefers_earlier_registration() {
        let literals = |kind: CommandKind| match kind {
            CommandKind::Lock => Some("/blurb".to_string()),
            _ => None,
        };
        let detected = detect_command("/blurb dead", literals).expect("detected");
        assert_eq!(detected.spec.kind, CommandKind::Blurb);
    }

    #[test]
    fn unit_is_rhetorical_question_requires_plain_text_and_question_reference() {
        assert!(is_rhetorical_question("Is this a duplicate of #123?"));
        assert!(!is_rhetorical_question("/duplicate of #123?"));
        assert!(!is_rhetorical_question("Duplicate of #123"));
        assert!(!is_rhetorical_question("Duplicate of #123 ?"));
    }

    #[test]
    fn unit_parse_quoted_title_unescapes_quotes() {
        let body = r#"/edit-title "New \"Title\"""#;
        assert_eq!(parse_quoted_title(body).as_deref(), Some(r#"New "Title""#));
    }

    #[test]
    fn functional_parse_quoted_title_drops_other_escapes_and_ignores_unquoted() {
        assert_eq!(
            parse_quoted_title(r#"/edit-title "tab\there" "second""#).as_deref(),
            Some("tabhere")
        );
        assert_eq!(parse_quoted_title("/edit-title no quotes"), None);
        assert_eq!(parse_quoted_title(r#"/edit-title """#).as_deref(), Some(""));
    }

    #[test]
    fn unit_lock_reason_from_body_uses_reason_priority() {
        assert_eq!(
            lock_reason_from_body("/lock spam and off-topic"),
            Some(LockReason::OffTopic)
        );
        assert_eq!(
            lock_reason_from_body("/lock too heated"),
            Some(LockReason::TooHeated)
        );
        assert_eq!(lock_reason_from_body("/lock"), None);
    }

    #[test]
    fn unit_match_blurb_returns_first_group_with_keyword() {
        let blurbs = vec![
            Blurb {
                keywords: vec!["".to_string()],
                message: "never".to_string(),
            },
            Blurb {
                keywords: vec!["dead".to_string(), "offline".to_string()],
                message: "Site is dead".to_string(),
            },
            Blurb {
                keywords: vec!["offline".to_string()],
                message: "later".to_string(),
            },
        ];
        assert_eq!(
            match_blurb("/blurb offline", &blurbs).map(|blurb| blurb.message.as_str()),
            Some("Site is dead")
        );
        assert!(match_blurb("/blurb unknown", &blurbs).is_none());
    }
}
