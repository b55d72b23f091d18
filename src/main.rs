//! mal-e2e - end-to-end scenario checks for the MyAnimeList v2 API
//!
//! Runs ordered groups of HTTP cases against the live API, chaining
//! extracted IDs between cases, and writes a JSON report artifact.

use clap::Parser;
use mal_e2e::{cli, commands::Commands, common};

#[derive(Parser)]
#[command(name = "mal-e2e", about = "End-to-end scenario checker for the MyAnimeList API")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Best-effort .env load so MAL_ACCESS_TOKEN can live in a local file
    let _ = dotenv::dotenv();

    common::logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
