mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

/// shipreport - see what a deployment package will do before it does it
#[derive(Parser)]
#[command(name = "shipreport")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Config file (default: $SHIPREPORT_CONFIG, then the per-user config)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Report the changes a package makes to the live store
  Report {
    /// Package archive (.zip or .update)
    package: PathBuf,

    /// JSON snapshot of the live store
    #[arg(short, long)]
    store: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Print per-partition counts only
    #[arg(long)]
    summary: bool,

    /// Reconcile partitions in parallel
    #[arg(long)]
    parallel: bool,
  },

  /// List the security accounts a package would install
  Accounts {
    /// Package archive (.zip or .update)
    package: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Print the effective configuration
  Config,
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Report {
      package,
      store,
      output,
      summary,
      parallel,
    } => cmd::cmd_report(
      &package,
      &store,
      cmd::ReportArgs {
        output,
        summary,
        parallel,
        verbose: cli.verbose,
      },
      cli.config.as_deref(),
    ),
    Commands::Accounts { package, output } => cmd::cmd_accounts(&package, output, cli.config.as_deref()),
    Commands::Config => cmd::cmd_config(cli.config.as_deref()),
  }
}
