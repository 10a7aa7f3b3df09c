//! Decision engine for the issue moderator.
//!
//! Everything in this crate is pure: text normalization, URL extraction,
//! rule evaluation, duplicate and catalog matching, and comment-command
//! parsing. Network collaborators live in `moderator-runtime`.

pub mod catalog_match;
pub mod duplicate_detect;
pub mod error;
pub mod issue_command_parser;
pub mod issue_filter;
pub mod issue_rules;
pub mod issue_snapshot;
pub mod message_template;
pub mod text_normalize;
pub mod url_extract;

pub use error::ConfigError;
pub use issue_snapshot::{IssueSnapshot, IssueState, LockReason, StateReason};
