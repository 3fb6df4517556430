// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `jobrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jobrun",
    version,
    about = "Run a graph of resumable jobs cooperatively, with suspend/resume.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the jobs manifest (TOML).
    ///
    /// Ignored in `--restore` mode.
    #[arg(long, value_name = "PATH", default_value = "Jobs.toml")]
    pub manifest: String,

    /// Restore scheduler state from the state file instead of reading the
    /// manifest.
    #[arg(short, long)]
    pub restore: bool,

    /// Path the scheduler snapshot is written to on interrupt (and read from
    /// in `--restore` mode).
    #[arg(short = 'f', long, value_name = "PATH", default_value = "state.json")]
    pub state_file: String,

    /// Abort the whole run on the first fatal job condition instead of
    /// finalizing only that job (debugging aid).
    #[arg(long)]
    pub atomic: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JOBRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the scheduled graph, but don't execute.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
