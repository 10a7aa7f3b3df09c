//! Named moderation inputs (rules, labels, toggles, templates).

use std::collections::HashMap;

use moderator_core::ConfigError;
use serde::de::DeserializeOwned;

/// Trait contract for the configuration provider.
pub trait InputProvider: Send + Sync {
    /// Raw value of the named input, if supplied.
    fn input(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Reads `INPUT_<NAME>` environment variables as published by the Actions runner.
pub struct EnvInputProvider;

impl EnvInputProvider {
    pub fn env_key(name: &str) -> String {
        format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
    }
}

impl InputProvider for EnvInputProvider {
    fn input(&self, name: &str) -> Option<String> {
        std::env::var(Self::env_key(name)).ok()
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory inputs.
pub struct StaticInputProvider {
    values: HashMap<String, String>,
}

impl StaticInputProvider {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }
}

impl InputProvider for StaticInputProvider {
    fn input(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Trimmed input value; blank counts as absent.
pub fn optional_input(inputs: &dyn InputProvider, name: &str) -> Option<String> {
    inputs
        .input(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn required_input(inputs: &dyn InputProvider, name: &str) -> Result<String, ConfigError> {
    optional_input(inputs, name).ok_or_else(|| ConfigError::MissingInput {
        name: name.to_string(),
    })
}

/// Enable flags are on only for the literal `true`.
pub fn bool_input(inputs: &dyn InputProvider, name: &str) -> bool {
    optional_input(inputs, name).is_some_and(|value| value == "true")
}

/// Toggle with a default used when the input is absent or not a boolean.
pub fn bool_input_or(inputs: &dyn InputProvider, name: &str, default: bool) -> bool {
    match optional_input(inputs, name).as_deref() {
        Some("true") => true,
        Some("false") => false,
        _ => default,
    }
}

pub fn json_input<T: DeserializeOwned>(
    inputs: &dyn InputProvider,
    name: &str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = optional_input(inputs, name) else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|error| ConfigError::InvalidJson {
            name: name.to_string(),
            message: error.to_string(),
        })
}

pub fn required_json_input<T: DeserializeOwned>(
    inputs: &dyn InputProvider,
    name: &str,
) -> Result<T, ConfigError> {
    json_input(inputs, name)?.ok_or_else(|| ConfigError::MissingInput {
        name: name.to_string(),
    })
}

/// Input value or the given default text.
pub fn input_or(inputs: &dyn InputProvider, name: &str, default: &str) -> String {
    optional_input(inputs, name).unwrap_or_else(|| default.to_string())
}
