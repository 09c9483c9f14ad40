//! Runtime configuration.
//!
//! Settings come from environment variables, optionally seeded from a
//! `.env` file; command line flags in the binary override them.

use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address the HTTP server binds to (`QUOTA_BIND_ADDR`).
    pub bind_addr: String,
    /// Optional JSON rule table (`QUOTA_RULES_PATH`).  The statutory
    /// defaults apply when unset.
    pub rules_path: Option<PathBuf>,
    /// Fallback log filter when `RUST_LOG` is unset (`QUOTA_LOG_LEVEL`).
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            rules_path: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the process environment after loading `.env` from the
    /// working directory, if one exists.  Variables already set win
    /// over the file.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`AppConfig::from_env`], but loads the given env file,
    /// which must exist.
    pub fn from_env_file(path: &Path) -> Result<Self, dotenvy::Error> {
        dotenvy::from_path(path)?;
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            bind_addr: non_empty("QUOTA_BIND_ADDR").unwrap_or(defaults.bind_addr),
            rules_path: non_empty("QUOTA_RULES_PATH").map(PathBuf::from),
            log_level: non_empty("QUOTA_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}
