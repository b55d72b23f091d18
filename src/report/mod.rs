//! Run reporting
//!
//! Reporters receive one event per finished case and are finalized once
//! at run end, pass or fail. They are side channels: nothing a reporter
//! does affects any case's outcome.

use serde::Serialize;
use std::path::PathBuf;

use crate::common::Result;
use crate::runner::{CaseOutcome, GroupOutcome, RunSummary};

/// Sink for run events
pub trait Reporter: Send {
    /// Called once per executed case, in execution order
    fn case_finished(&mut self, outcome: &CaseOutcome);

    /// Called after the last case of each group
    fn group_finished(&mut self, _outcome: &GroupOutcome) {}

    /// Called exactly once after all groups complete; flushes buffered
    /// data to the report destination
    fn end(&mut self, summary: &RunSummary) -> Result<()>;
}

/// Buffers outcomes and writes a JSON artifact at run end
pub struct JsonReporter {
    path: PathBuf,
    cases: Vec<CaseOutcome>,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    #[serde(flatten)]
    summary: RunSummary,
    groups: Vec<GroupRecord<'a>>,
}

#[derive(Serialize)]
struct GroupRecord<'a> {
    name: &'a str,
    cases: Vec<&'a CaseOutcome>,
}

impl JsonReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cases: Vec::new(),
        }
    }

    fn document<'a>(&'a self, summary: &'a RunSummary) -> ReportDocument<'a> {
        let mut groups: Vec<GroupRecord<'a>> = Vec::new();
        for case in &self.cases {
            match groups.last_mut() {
                Some(record) if record.name == case.group => record.cases.push(case),
                _ => groups.push(GroupRecord {
                    name: &case.group,
                    cases: vec![case],
                }),
            }
        }
        ReportDocument {
            summary: summary.clone(),
            groups,
        }
    }
}

impl Reporter for JsonReporter {
    fn case_finished(&mut self, outcome: &CaseOutcome) {
        self.cases.push(outcome.clone());
    }

    fn end(&mut self, summary: &RunSummary) -> Result<()> {
        let document = self.document(summary);
        let json = serde_json::to_string_pretty(&document)?;
        std::fs::write(&self.path, json)?;
        tracing::info!(path = %self.path.display(), "report written");
        Ok(())
    }
}
