//! Configuration file and environment handling
//!
//! Settings are layered: built-in defaults, then an optional
//! `mal-e2e.toml` in the working directory, then CLI flags. The access
//! token only ever comes from the environment.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{Error, Result};

/// Environment variable supplying the bearer credential
pub const TOKEN_ENV_VAR: &str = "MAL_ACCESS_TOKEN";

/// Default config file looked up in the working directory
const CONFIG_FILE: &str = "mal-e2e.toml";

/// Resolved settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Base URL of the API under test
    pub base_url: String,
    /// Per-request timeout ceiling in seconds
    pub timeout_secs: u64,
    /// Bearer credential, immutable for the run
    pub token: String,
    /// Where the JSON report artifact is written
    pub report_path: PathBuf,
}

/// On-disk configuration (all fields optional)
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

/// CLI-level overrides, applied last
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub report_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://api.myanimelist.net/v2".to_string()
}

impl FileConfig {
    /// Load the config file if present; a missing file is not an error
    pub fn load_default() -> Result<Self> {
        Self::load(Path::new(CONFIG_FILE))
    }

    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse '{}': {}", path.display(), e)))
    }
}

impl RunConfig {
    /// Build the run configuration from defaults, file, environment, and
    /// CLI overrides.
    ///
    /// Fails with [`Error::MissingCredential`] before any HTTP call is
    /// attempted if the token variable is unset or empty.
    pub fn load(overrides: Overrides) -> Result<Self> {
        let file = FileConfig::load_default()?;

        let token = std::env::var(TOKEN_ENV_VAR).unwrap_or_default();
        if token.trim().is_empty() {
            return Err(Error::MissingCredential);
        }

        Ok(Self {
            base_url: overrides
                .base_url
                .or(file.base_url)
                .unwrap_or_else(default_base_url),
            timeout_secs: overrides.timeout_secs.or(file.timeout_secs).unwrap_or(30),
            token,
            report_path: overrides
                .report_path
                .or(file.report_path)
                .unwrap_or_else(|| PathBuf::from("mal-e2e-report.json")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_defaults_when_absent() {
        let cfg = FileConfig::load(Path::new("/nonexistent/mal-e2e.toml")).unwrap();
        assert!(cfg.base_url.is_none());
        assert!(cfg.timeout_secs.is_none());
    }

    #[test]
    fn file_config_parses_partial_toml() {
        let cfg: FileConfig = toml::from_str("timeout_secs = 10").unwrap();
        assert_eq!(cfg.timeout_secs, Some(10));
        assert!(cfg.base_url.is_none());
    }

    #[test]
    fn file_config_rejects_bad_toml() {
        let err = toml::from_str::<FileConfig>("timeout_secs = \"soon\"");
        assert!(err.is_err());
    }
}
