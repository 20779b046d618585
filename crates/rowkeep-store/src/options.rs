// ABOUTME: Tunables for the table store: delimiter, header policy, locking, and fsync.
// ABOUTME: Defaults reproduce plain comma-separated files with silent header tolerance.

use std::fmt;
use std::str::FromStr;

use rowkeep_core::DEFAULT_DELIMITER;

/// What `ensure_exists` does when the table file is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderPolicy {
    /// Leave the existing file alone without looking at its header.
    #[default]
    Tolerate,
    /// Read the existing header and fail if it differs from the requested one.
    Strict,
}

impl FromStr for HeaderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tolerate" => Ok(HeaderPolicy::Tolerate),
            "strict" => Ok(HeaderPolicy::Strict),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for HeaderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderPolicy::Tolerate => write!(f, "tolerate"),
            HeaderPolicy::Strict => write!(f, "strict"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub delimiter: char,
    pub header_policy: HeaderPolicy,
    /// Hold an exclusive advisory lock on `<file>.lock` during mutations.
    pub lock: bool,
    /// fsync data (and the parent directory after a rename) before returning.
    pub sync: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            header_policy: HeaderPolicy::default(),
            lock: true,
            sync: true,
        }
    }
}
