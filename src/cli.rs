// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::HumanDuration;

/// Command-line arguments for `dlwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dlwatch",
    version,
    about = "Wait for downloads and files to land, and bootstrap per-run work folders.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Dlwatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DLWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Wait for a completed download to appear in FOLDER and print its path.
    Download {
        folder: PathBuf,

        /// Only accept this exact file name.
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        #[command(flatten)]
        baseline: BaselineArgs,

        #[command(flatten)]
        timing: TimingArgs,

        /// In-progress suffix to ignore (repeatable; replaces the configured list).
        #[arg(long = "partial-suffix", value_name = "SUFFIX")]
        partial_suffixes: Vec<String>,
    },

    /// Wait for any new entry in FOLDER (no suffix filter, no read probe).
    NewFile {
        folder: PathBuf,

        #[command(flatten)]
        baseline: BaselineArgs,

        #[command(flatten)]
        timing: TimingArgs,
    },

    /// Wait until PATH exists.
    Exists {
        path: PathBuf,

        #[command(flatten)]
        timing: TimingArgs,
    },

    /// Wait until PATH is a regular file that can be opened for reading.
    Ready {
        path: PathBuf,

        #[command(flatten)]
        timing: TimingArgs,
    },

    /// Print the most recently modified file in FOLDER.
    Latest { folder: PathBuf },

    /// Print the entry names in FOLDER, one per line (use as a baseline).
    Snapshot { folder: PathBuf },

    /// Wipe `<root>/data` and create a timestamped run layout; print it as JSON.
    Init {
        /// Root under which `data/` is created (overrides config).
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// strftime-style format for the run folder name (overrides config).
        #[arg(long, value_name = "FORMAT")]
        timestamp_format: Option<String>,

        /// IANA timezone for the timestamp, e.g. `Asia/Tokyo` (overrides config).
        #[arg(long, value_name = "TZ")]
        timezone: Option<String>,

        /// Print the planned layout without touching the filesystem.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Names treated as pre-existing. Without either flag the folder is
/// snapshotted when waiting starts.
#[derive(Debug, Clone, Default, Args)]
pub struct BaselineArgs {
    /// Entry name present before the download started (repeatable).
    #[arg(long = "baseline", value_name = "NAME")]
    pub names: Vec<String>,

    /// File with one pre-existing entry name per line (e.g. `snapshot` output).
    #[arg(long = "baseline-file", value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Args)]
pub struct TimingArgs {
    /// Give up after this long, e.g. `90s` (overrides config).
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<HumanDuration>,

    /// Pause between checks, e.g. `500ms` (overrides config).
    #[arg(long, value_name = "DURATION")]
    pub poll_interval: Option<HumanDuration>,
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
