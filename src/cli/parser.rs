use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for prmonitor
/// CLI application to track pull request timing with SQLite
#[derive(Parser)]
#[command(
    name = "prmonitor",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track whether team members open pull requests within working hours",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(global = true, short = 'v', long = "verbose")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Analysis period and report naming shared by `run` and `report`.
#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// First date of the analysis (YYYY-MM-DD, default: 7 days ago)
    #[arg(long = "start-date")]
    pub start_date: Option<String>,

    /// Last date of the analysis (YYYY-MM-DD, default: today)
    #[arg(long = "end-date")]
    pub end_date: Option<String>,

    /// Prefix of the generated report files (may include a directory)
    #[arg(long = "output-prefix", default_value = "pr_report")]
    pub output_prefix: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Fetch pull requests, analyze the period and write the reports
    Run {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Analyze the cached data only and write the reports (no network)
    Report {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Inspect the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration for missing or invalid fields")]
        check: bool,
    },

    /// Manage the database (integrity checks, statistics, etc.)
    Db {
        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },
}
