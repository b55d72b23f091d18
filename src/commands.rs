//! CLI command definitions

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run scenario groups against the API
    Run {
        /// Built-in group to run (repeatable; default: all)
        #[arg(long = "group", short = 'g')]
        groups: Vec<String>,

        /// Run a scenario group from a YAML file instead of the
        /// built-in suite
        #[arg(long, conflicts_with = "groups")]
        scenario: Option<PathBuf>,

        /// Where to write the JSON report artifact
        #[arg(long)]
        report: Option<PathBuf>,

        /// Base URL of the API
        #[arg(long)]
        base_url: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List the built-in scenario groups and their cases
    List,
}
