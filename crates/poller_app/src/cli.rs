use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Poll one HTTP endpoint and keep a copy of every distinct response.
#[derive(Debug, Parser)]
#[command(name = "dedup_poller")]
#[command(about = "Poll an HTTP endpoint and save each distinct response once", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// RON file with default settings; flags below override it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Endpoint to poll.
    #[arg(long)]
    pub url: Option<String>,

    /// Stop after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub duration_secs: Option<u64>,

    /// Stop after saving this many unique responses.
    #[arg(long, value_name = "N")]
    pub max_unique: Option<usize>,

    /// Pause between requests.
    #[arg(long, value_name = "SECS")]
    pub delay_secs: Option<u64>,

    /// Directory for saved responses.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Give up on a request after this many seconds (default: wait forever).
    #[arg(long, value_name = "SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Give up connecting after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub connect_timeout_secs: Option<u64>,

    /// Mirror the log to stderr in addition to the log file.
    #[arg(long)]
    pub log_to_terminal: bool,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Poll the endpoint (the default when no subcommand is given).
    Poll,

    /// Summarize the user data in previously saved responses.
    Stats {
        /// Directory of saved responses (default: the configured output directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}
