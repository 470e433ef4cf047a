mod cli;
mod config;
mod console;
mod stats_cmd;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use poll_logging::{poll_info, poll_warn, LogDestination};
use poller_engine::{Poller, ReqwestFetcher, ResponsePersister};
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, CliCommand};
use crate::config::PollerConfig;
use crate::console::ConsoleSink;

const LOG_FILE: &str = "./dedup_poller.log";

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = PollerConfig::resolve(&cli)?;

    let destination = if cli.log_to_terminal {
        LogDestination::Both
    } else {
        LogDestination::File
    };
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    poll_logging::initialize(destination, level, Path::new(LOG_FILE));
    poll_info!("Resolved configuration: {:?}", config);

    if let Some(CliCommand::Stats { dir }) = &cli.command {
        let dir = dir.as_deref().unwrap_or(&config.output_dir);
        return Ok(stats_cmd::execute(dir));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))?;
    Ok(ExitCode::SUCCESS)
}

async fn run(config: PollerConfig) -> anyhow::Result<()> {
    let fetcher = ReqwestFetcher::new(config.fetch_settings())?;
    let persister = ResponsePersister::new(config.output_dir.clone());
    let poller = Poller::new(config.poll_settings(), Box::new(fetcher), persister);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                poll_info!("Interrupt received, stopping");
                on_signal.cancel();
            }
            Err(err) => poll_warn!("Could not listen for Ctrl-C: {}", err),
        }
    });

    let mut state = poller.begin();
    poller.run(&mut state, &ConsoleSink, &cancel).await;
    Ok(())
}
