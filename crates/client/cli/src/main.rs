//! Headless seeker session driver.
//!
//! Runs scripted scenarios against the runtime and inspects persisted event
//! logs.
//!
//! ```bash
//! dungeon-sim run demos/harvest.ron --pretty
//! dungeon-sim events --session harvest
//! ```

mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{ReadEvents, RunScenario};

/// Seeker session simulator
#[derive(Parser)]
#[command(name = "dungeon-sim")]
#[command(about = "Run and inspect seeker sessions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a RON scenario and print its report
    Run(RunScenario),

    /// Read a persisted session event log
    Events(ReadEvents),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(cmd) => cmd.execute().await,
        Command::Events(cmd) => cmd.execute(),
    }
}
