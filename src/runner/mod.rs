//! Scenario model, assertion engine, and sequential runner

pub mod assert;
pub mod runner;
pub mod scenario;

pub use assert::Assertion;
pub use runner::{CaseOutcome, GroupOutcome, RunSummary, Runner};
pub use scenario::{Extraction, GroupContext, ScenarioGroup, TestCase};
