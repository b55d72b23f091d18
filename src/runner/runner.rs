//! Scenario execution
//!
//! Runs groups in declared order and cases strictly sequentially within
//! a group; each case is awaited to completion before the next starts
//! because later cases depend on state extracted by earlier ones. A
//! failing case never stops its group or the run; only a fatal setup
//! error (missing credential, bad scenario file) aborts before any case.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::client::Transport;
use crate::common::{Result, RunConfig};
use crate::report::Reporter;

use super::assert::Assertion;
use super::scenario::{GroupContext, ScenarioGroup, TestCase};

/// Result of one executed case
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub group: String,
    pub name: String,
    pub passed: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one executed group
#[derive(Debug, Clone, Serialize)]
pub struct GroupOutcome {
    pub name: String,
    pub cases: Vec<CaseOutcome>,
    pub failed: usize,
}

/// Totals for a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at_ms: u64,
    pub duration_ms: u64,
    pub groups: usize,
    pub cases: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Executes scenario groups through a [`Transport`]
pub struct Runner<'a, T: Transport> {
    transport: &'a T,
    config: &'a RunConfig,
    reporters: Vec<Box<dyn Reporter>>,
}

impl<'a, T: Transport> Runner<'a, T> {
    pub fn new(transport: &'a T, config: &'a RunConfig) -> Self {
        Self {
            transport,
            config,
            reporters: Vec::new(),
        }
    }

    /// Register a reporter; must happen before [`Runner::run`]
    pub fn add_reporter(&mut self, reporter: Box<dyn Reporter>) {
        self.reporters.push(reporter);
    }

    /// Run every group in order and finalize all reporters
    ///
    /// Reporters are finalized unconditionally, whether or not cases
    /// failed; their outcome never affects the summary.
    pub async fn run(mut self, groups: &[ScenarioGroup]) -> Result<RunSummary> {
        let started_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let clock = Instant::now();

        let mut cases = 0;
        let mut failed = 0;

        for group in groups {
            let outcome = self.run_group(group).await;
            cases += outcome.cases.len();
            failed += outcome.failed;
            for reporter in &mut self.reporters {
                reporter.group_finished(&outcome);
            }
        }

        let summary = RunSummary {
            started_at_ms,
            duration_ms: clock.elapsed().as_millis() as u64,
            groups: groups.len(),
            cases,
            failed,
        };

        for reporter in &mut self.reporters {
            if let Err(e) = reporter.end(&summary) {
                eprintln!("Warning: reporter failed to finalize: {e}");
            }
        }

        Ok(summary)
    }

    async fn run_group(&mut self, group: &ScenarioGroup) -> GroupOutcome {
        println!(
            "\n{} {}",
            "Running group:".blue().bold(),
            group.name.white().bold()
        );
        if let Some(desc) = &group.description {
            println!("  {}", desc.dimmed());
        }

        let mut ctx = GroupContext::new();
        let mut outcomes = Vec::with_capacity(group.cases.len());
        let mut failed = 0;

        for (i, case) in group.cases.iter().enumerate() {
            let case_num = i + 1;
            let outcome = self.run_case(group, case, &mut ctx).await;

            match &outcome.error {
                None => {
                    println!(
                        "  {} Case {}: {}",
                        "✓".green(),
                        case_num,
                        case.name.dimmed()
                    );
                }
                Some(error) => {
                    failed += 1;
                    println!("  {} Case {}: {}: {}", "✗".red(), case_num, case.name, error);
                }
            }

            for reporter in &mut self.reporters {
                reporter.case_finished(&outcome);
            }
            outcomes.push(outcome);
        }

        GroupOutcome {
            name: group.name.clone(),
            cases: outcomes,
            failed,
        }
    }

    async fn run_case(
        &self,
        group: &ScenarioGroup,
        case: &TestCase,
        ctx: &mut GroupContext,
    ) -> CaseOutcome {
        let clock = Instant::now();
        let result = self.execute_case(case, ctx).await;

        CaseOutcome {
            group: group.name.clone(),
            name: case.name.clone(),
            passed: result.is_ok(),
            duration_ms: clock.elapsed().as_millis() as u64,
            error: result.err().map(|e| e.to_string()),
        }
    }

    async fn execute_case(&self, case: &TestCase, ctx: &mut GroupContext) -> Result<()> {
        for key in &case.requires {
            ctx.require(key)?;
        }

        if let Some(cleanup) = &case.cleanup {
            // Best-effort: the outcome is discarded by contract so stale
            // remote state never fails the primary action.
            let request = ctx.resolve(cleanup, &self.config.base_url);
            match self.transport.send(&request).await {
                Ok(response) => debug!(status = response.status, "cleanup request finished"),
                Err(e) => debug!(error = %e, "cleanup request failed (ignored)"),
            }
        }

        let request = ctx.resolve(&case.request, &self.config.base_url);
        let response = self.transport.send(&request).await?;

        for assertion in &case.expect {
            interpolate_assertion(ctx, assertion).evaluate(&response)?;
        }

        if let Some(extraction) = &case.extract {
            let body = response.json()?;
            let value = super::assert::resolve_path(&body, &extraction.path)?;
            ctx.set(&extraction.store, value);
        }

        Ok(())
    }
}

/// Substitute `{key}` placeholders in an assertion's expected values
fn interpolate_assertion(ctx: &GroupContext, assertion: &Assertion) -> Assertion {
    match assertion {
        Assertion::JsonLike { path, value } => Assertion::JsonLike {
            path: path.clone(),
            value: ctx.interpolate_value(value),
        },
        Assertion::JsonNotLike { path, value } => Assertion::JsonNotLike {
            path: path.clone(),
            value: ctx.interpolate_value(value),
        },
        Assertion::BodyContains { value } => Assertion::BodyContains {
            value: ctx.interpolate(value),
        },
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interpolation_preserves_extracted_id_type_in_expected_values() {
        let mut ctx = GroupContext::new();
        ctx.set("animeId", json!(52991));
        let assertion = Assertion::json_like_at("data[*].node.id", json!(["{animeId}"]));
        match interpolate_assertion(&ctx, &assertion) {
            Assertion::JsonLike { value, .. } => assert_eq!(value, json!([52991])),
            other => panic!("unexpected assertion: {other:?}"),
        }
    }

    #[test]
    fn summary_reports_all_passed() {
        let summary = RunSummary {
            started_at_ms: 0,
            duration_ms: 1,
            groups: 1,
            cases: 4,
            failed: 0,
        };
        assert!(summary.all_passed());
    }
}
