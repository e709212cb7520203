use std::{io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_INDENT;

/// Configuration for the picker.
///
/// Controls how search input is debounced, how large each collection query
/// is, and how option labels are indented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// How long input must be idle before a search is issued, in
    /// milliseconds.
    debounce_ms: u64,

    /// The maximum number of items requested per collection query.
    per_page: u32,

    /// The prefix repeated once per level of depth in option labels.
    indent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            per_page: default_per_page(),
            indent: default_indent(),
        }
    }
}

/// Errors that can occur when loading or saving a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),
    /// The configuration file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The debounce interval for search input.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Sets the debounce interval, in milliseconds.
    pub const fn set_debounce_ms(&mut self, millis: u64) {
        self.debounce_ms = millis;
    }

    /// The maximum number of items requested per query.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Sets the number of items requested per query.
    ///
    /// Zero is raised to one.
    pub fn set_per_page(&mut self, per_page: u32) {
        self.per_page = per_page.max(1);
    }

    /// The label indent string.
    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }
}

const fn default_debounce_ms() -> u64 {
    300
}

const fn default_per_page() -> u32 {
    100
}

fn default_indent() -> String {
    DEFAULT_INDENT.to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_debounce_ms")]
        debounce_ms: u64,

        #[serde(default = "default_per_page")]
        per_page: u32,

        #[serde(default = "default_indent")]
        indent: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                debounce_ms,
                per_page,
                indent,
            } => Self {
                debounce_ms,
                per_page: per_page.max(1),
                indent,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            debounce_ms: config.debounce_ms,
            per_page: config.per_page,
            indent: config.indent,
        }
    }
}
