//! CLI command handling
//!
//! Loads configuration, assembles the scenario groups and reporters,
//! and hands off to the runner.

use colored::Colorize;

use crate::client::HttpTransport;
use crate::commands::Commands;
use crate::common::{Error, Overrides, Result, RunConfig};
use crate::report::JsonReporter;
use crate::runner::{Runner, ScenarioGroup};
use crate::scenarios;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            groups,
            scenario,
            report,
            base_url,
            timeout,
        } => {
            // The credential gate: config loading fails before any HTTP
            // call or reporter event when MAL_ACCESS_TOKEN is absent.
            let config = RunConfig::load(Overrides {
                base_url,
                timeout_secs: timeout,
                report_path: report,
            })?;

            let selected: Vec<ScenarioGroup> = if let Some(path) = scenario {
                vec![ScenarioGroup::from_yaml_file(&path)?]
            } else if groups.is_empty() {
                scenarios::all()
            } else {
                scenarios::select(&groups)?
            };

            let transport = HttpTransport::new(&config)?;
            let mut runner = Runner::new(&transport, &config);
            runner.add_reporter(Box::new(JsonReporter::new(&config.report_path)));

            let summary = runner.run(&selected).await?;

            if summary.all_passed() {
                println!(
                    "\n{} {} case(s) passed in {} ms\n",
                    "✓".green().bold(),
                    summary.cases,
                    summary.duration_ms
                );
                Ok(())
            } else {
                println!(
                    "\n{} {}/{} case(s) failed\n",
                    "✗".red().bold(),
                    summary.failed,
                    summary.cases
                );
                Err(Error::CasesFailed(summary.failed))
            }
        }

        Commands::List => {
            for group in scenarios::all() {
                println!("{}", group.name.white().bold());
                if let Some(desc) = &group.description {
                    println!("  {}", desc.dimmed());
                }
                for (i, case) in group.cases.iter().enumerate() {
                    println!("  {}. {}", i + 1, case.name);
                }
                println!();
            }
            Ok(())
        }
    }
}
