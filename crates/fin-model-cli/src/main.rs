mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::debt::DebtScheduleArgs;
use commands::run::RunArgs;

/// Scenario-driven three-statement financial projections
#[derive(Parser)]
#[command(
    name = "fpm",
    version,
    about = "Scenario-driven three-statement financial projections",
    long_about = "Projects a scenario's assumptions into a linked income statement, \
                  cash flow statement, and balance sheet with decimal precision, \
                  plus ratios and DCF valuation metrics. Input is a JSON scenario \
                  bundle via --input or stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full scenario calculation
    Run(RunArgs),
    /// Build a standalone debt schedule from financing terms
    DebtSchedule(DebtScheduleArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Run(args) => commands::run::run_scenario(args),
        Commands::DebtSchedule(args) => commands::debt::run_debt_schedule(args),
        Commands::Version => {
            println!("fpm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
