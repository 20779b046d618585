// ABOUTME: Configuration loading and validation for rowkeep.
// ABOUTME: Reads ROWKEEP_* environment variables and turns them into table store options.

use rowkeep_core::DEFAULT_DELIMITER;
use rowkeep_store::{HeaderPolicy, StoreOptions};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("delimiter must be a single character other than a quote or line break, got {0:?}")]
    InvalidDelimiter(String),

    #[error("ROWKEEP_HEADER_POLICY must be `tolerate` or `strict`, got {0:?}")]
    InvalidHeaderPolicy(String),

    #[error("{var} must be a boolean (true/false, 1/0, yes/no), got {value:?}")]
    InvalidBool { var: &'static str, value: String },
}

/// Settings loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowkeepConfig {
    pub delimiter: char,
    pub header_policy: HeaderPolicy,
    pub lock: bool,
    pub sync: bool,
}

impl Default for RowkeepConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            header_policy: HeaderPolicy::Tolerate,
            lock: true,
            sync: true,
        }
    }
}

impl RowkeepConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - ROWKEEP_DELIMITER: field separator (default: `,`; `tab` or `\t` for tab)
    /// - ROWKEEP_HEADER_POLICY: `tolerate` or `strict` (default: tolerate)
    /// - ROWKEEP_LOCK: take an advisory lock while writing (default: true)
    /// - ROWKEEP_SYNC: fsync after every write (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("ROWKEEP_DELIMITER").filter(|v| !v.is_empty()) {
            config.delimiter = parse_delimiter(&raw)?;
        }

        if let Some(raw) = lookup("ROWKEEP_HEADER_POLICY").filter(|v| !v.is_empty()) {
            config.header_policy = raw
                .parse::<HeaderPolicy>()
                .map_err(ConfigError::InvalidHeaderPolicy)?;
        }

        if let Some(raw) = lookup("ROWKEEP_LOCK") {
            config.lock = parse_bool("ROWKEEP_LOCK", &raw)?;
        }

        if let Some(raw) = lookup("ROWKEEP_SYNC") {
            config.sync = parse_bool("ROWKEEP_SYNC", &raw)?;
        }

        Ok(config)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            delimiter: self.delimiter,
            header_policy: self.header_policy,
            lock: self.lock,
            sync: self.sync,
        }
    }
}

/// Parse a delimiter setting. Quotes and line breaks are reserved by the codec.
pub fn parse_delimiter(raw: &str) -> Result<char, ConfigError> {
    if raw == "tab" || raw == "\\t" {
        return Ok('\t');
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '"' && c != '\n' && c != '\r' => Ok(c),
        _ => Err(ConfigError::InvalidDelimiter(raw.to_string())),
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: raw.to_string(),
        }),
    }
}
