//! errgrade - score error-case assertions from the command line.
//!
//! Reads an output (argument, file or stdin), scores it with the error-case
//! scorer, and prints the grading result as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;

/// errgrade - error-case assertion scorer
#[derive(Parser, Debug)]
#[command(name = "errgrade")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a single output
    Score(ScoreArgs),

    /// Score every case in a suite file
    Batch(BatchArgs),
}

#[derive(clap::Args, Debug)]
struct ScoreArgs {
    /// Output JSON text; omit or pass "-" to read stdin
    output: Option<String>,

    /// Read the output from a file instead
    #[arg(short, long, conflicts_with = "output")]
    file: Option<PathBuf>,

    /// Test variable as KEY=VALUE (VALUE is parsed as JSON when possible)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    vars: Vec<String>,

    /// Test variables as a JSON object; --var entries override these
    #[arg(long)]
    vars_json: Option<String>,

    #[command(flatten)]
    scorer: ScorerArgs,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Args, Debug)]
struct BatchArgs {
    /// Suite file (YAML, or JSON with a .json extension)
    suite: PathBuf,

    #[command(flatten)]
    scorer: ScorerArgs,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

#[derive(clap::Args, Debug)]
struct ScorerArgs {
    /// Scorer config file (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Score unparseable output as a failure instead of an error
    #[arg(long)]
    lenient: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ReportFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Commands::Score(args) => commands::score(args),
        Commands::Batch(args) => commands::batch(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}
