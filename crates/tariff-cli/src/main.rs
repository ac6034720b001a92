mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::bill::BillArgs;
use commands::calendar::WorkingDaysArgs;
use commands::sweep::SweepArgs;
use commands::tariff::TariffArgs;

/// Itemized domestic electricity bills
#[derive(Parser)]
#[command(
    name = "ebill",
    version,
    about = "Itemized domestic electricity bills",
    long_about = "Computes domestic electricity bills with decimal precision: slab energy \
                  charges, prorated fixed charges, FSA, electricity duty, municipal tax and \
                  the working-day late-payment surcharge."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine decisions to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute an itemized bill
    Bill(BillArgs),
    /// Add working days (Mon-Fri) to a date
    WorkingDays(WorkingDaysArgs),
    /// Recompute a bill across a range of consumed units
    Sweep(SweepArgs),
    /// Show the active tariff schedule
    Tariff(TariffArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Install a stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Bill(args) => commands::bill::run_bill(args),
        Commands::WorkingDays(args) => commands::calendar::run_working_days(args),
        Commands::Sweep(args) => commands::sweep::run_sweep(args),
        Commands::Tariff(args) => commands::tariff::run_tariff(args),
        Commands::Version => {
            println!("ebill {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
