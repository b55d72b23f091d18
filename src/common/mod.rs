//! Common utilities shared across the crate

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Overrides, RunConfig, TOKEN_ENV_VAR};
pub use error::{Error, Result};
