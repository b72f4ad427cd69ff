use clap::Parser;
use hostwatch::config::Config;
use hostwatch::orchestrator::Orchestrator;
use hostwatch::state::OffsetStore;
use log::{error, info};
use std::path::PathBuf;

/// Command-line arguments for the host health-check agent
#[derive(Parser)]
#[command(
    name = "hostwatch",
    about = "Host health-check agent - resource, service and log monitoring",
    long_about = "Runs one check cycle over the configured probes: disk, RAM and CPU \
                  thresholds, pm2 applications, OS processes, and incremental keyword \
                  scanning of log files. Issues are consolidated into a single email \
                  notification. Probes are enabled through environment variables; see \
                  FREE_DISK_THRESHOLD, FREE_RAM_THRESHOLD, CPU_UTIL_THRESHOLD, PM2_APPS, \
                  PROCESSES, LOG_FILES, SEARCH_WORDS, SMTP_HOST and NOTIFY_EMAIL."
)]
struct Cli {
    /// Path of the persisted log offset table
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "hostwatch_offsets.json",
        help = "Where to persist per-log-file read offsets"
    )]
    state_file: PathBuf,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose && std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // The agent's own instability must never become an incident: any
    // unhandled failure is logged and the process still exits 0.
    if let Err(e) = run(&cli) {
        error!("Check cycle failed: {:#}", e);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::from_env();
    let mut store = OffsetStore::load(&cli.state_file);

    info!(
        "Starting check cycle (state file: {})",
        store.path().display()
    );
    Orchestrator::new(config).run(&mut store);
    info!("Check cycle complete");

    Ok(())
}
