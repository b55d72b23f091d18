//! End-to-end scenario checks for the MyAnimeList v2 REST API
//!
//! The library half of the crate: a declarative scenario model, a
//! sequential runner with chained value extraction, an assertion engine
//! (status, JSON subset, JSON schema, body checks), a transport seam
//! over reqwest, and pluggable run reporters.

pub mod cli;
pub mod client;
pub mod commands;
pub mod common;
pub mod report;
pub mod runner;
pub mod scenarios;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use runner::{Assertion, Runner, ScenarioGroup, TestCase};
