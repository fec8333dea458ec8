//! equitywater CLI - cap-table waterfall and PWERM operations
//!
//! # Commands
//!
//! - `captable waterfall` - Allocate an exit value across a cap table
//! - `captable pwerm` - Run a probability-weighted exit valuation
//! - `captable sweep` - Allocate across an exit-value grid
//! - `captable evolve` - Replay financing rounds into snapshots
//! - `captable fund` - Apply the fund-level LP/GP waterfall
//!
//! Every command reads JSON from a file and writes JSON to stdout or a
//! file; the engine crates never touch the filesystem themselves.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod io;

/// equitywater cap-table waterfall & PWERM CLI
#[derive(Parser)]
#[command(name = "captable")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate an exit value across a cap table
    Waterfall {
        /// Path to a JSON array of share classes
        #[arg(short, long)]
        input: String,

        /// Exit value in dollars
        #[arg(short, long)]
        exit_value: f64,

        /// Snapshot date (YYYY-MM-DD); defaults to today
        #[arg(short, long)]
        as_of: Option<String>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run a discrete PWERM valuation
    Pwerm {
        /// Path to a JSON PWERM request (share classes + scenarios)
        #[arg(short, long)]
        input: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Allocate across an evenly spaced exit-value grid
    Sweep {
        /// Path to a JSON array of share classes
        #[arg(short, long)]
        input: String,

        /// Low end of the exit range, in dollars
        #[arg(long)]
        low: f64,

        /// High end of the exit range, in dollars
        #[arg(long)]
        high: f64,

        /// Number of grid points
        #[arg(short, long, default_value = "11")]
        steps: usize,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Replay financing rounds into a snapshot time series
    Evolve {
        /// Path to a JSON evolution request (founder shares + rounds)
        #[arg(short, long)]
        input: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Apply the fund-level LP/GP waterfall
    Fund {
        /// Path to a JSON fund request (terms + proceeds + years)
        #[arg(short, long)]
        input: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Waterfall {
            input,
            exit_value,
            as_of,
            output,
        } => commands::waterfall::run(&input, exit_value, as_of.as_deref(), output.as_deref()),
        Commands::Pwerm { input, output } => commands::pwerm::run(&input, output.as_deref()),
        Commands::Sweep {
            input,
            low,
            high,
            steps,
            output,
        } => commands::sweep::run(&input, low, high, steps, output.as_deref()),
        Commands::Evolve { input, output } => commands::evolve::run(&input, output.as_deref()),
        Commands::Fund { input, output } => commands::fund::run(&input, output.as_deref()),
    }
}
