//! Error types for the scenario checker
//!
//! Only a missing credential is fatal for a whole run; assertion,
//! path-resolution, precondition, and transport errors stay local to
//! the case that produced them.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scenario checker
#[derive(Error, Debug)]
pub enum Error {
    // === Setup Errors ===
    #[error("MAL_ACCESS_TOKEN not set. Check your .env file or the CI secrets configuration")]
    MissingCredential,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid scenario file: {0}")]
    ScenarioParse(String),

    // === Case-local Errors ===
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("JSON path '{path}' did not resolve: {detail}")]
    PathResolution { path: String, detail: String },

    #[error("Missing precondition: '{0}' was never extracted by an earlier case")]
    MissingPrecondition(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request URL '{0}'")]
    InvalidUrl(String),

    // === Run Outcome ===
    #[error("{0} case(s) failed")]
    CasesFailed(usize),

    // === IO / Serialization Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an assertion error with an expected-vs-actual description
    pub fn assertion_mismatch(
        what: &str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::Assertion(format!("{what}: expected {expected}, got {actual}"))
    }

    /// Create a path resolution error
    pub fn path_resolution(path: &str, detail: impl Into<String>) -> Self {
        Self::PathResolution {
            path: path.to_string(),
            detail: detail.into(),
        }
    }

    /// Whether this error aborts the whole run rather than a single case
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MissingCredential | Error::Config(_) | Error::ScenarioParse(_)
        )
    }
}
