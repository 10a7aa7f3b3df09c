use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Configuration problems detected before any issue mutation happens.
pub enum ConfigError {
    #[error("input required and not supplied: {name}")]
    MissingInput { name: String },
    #[error("input '{name}' is not valid JSON for its expected shape: {message}")]
    InvalidJson { name: String, message: String },
    #[error("rule #{index} has an empty pattern")]
    EmptyPattern { index: usize },
    #[error("rule #{index} has an invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        index: usize,
        pattern: String,
        message: String,
    },
}
