//! Troubadour Control - guided hardware qualification on the unit itself
//!
//! Collects the inventory, runs the display test, checks the unit serial
//! number and writes the qualification record.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use troubadour_common::config::config_path;
use troubadour_common::probe::SystemProbe;
use troubadour_common::{privilege, TroubadourConfig};
use troubadourctl::errors::{self, EXIT_GENERAL_ERROR, EXIT_NOT_PRIVILEGED};
use troubadourctl::logging;
use troubadourctl::power::SystemPower;
use troubadourctl::runtime::Wizard;
use troubadourctl::tui::TuiPresenter;

#[derive(Parser)]
#[command(name = "troubadourctl")]
#[command(about = "Troubadour - guided hardware qualification wizard", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for qualification records (overrides [record] dir)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Display test pattern interval in milliseconds
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Run without root (development only; most probes return nothing)
    #[arg(long)]
    skip_privilege_check: bool,

    /// Debug-level diagnostics in the trace file
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<TroubadourConfig> {
    let path = cli.config.clone().unwrap_or_else(config_path);
    let mut config = TroubadourConfig::load_from(&path)?;

    if let Some(dir) = &cli.log_dir {
        config.record.dir = dir.clone();
    }
    if let Some(ms) = cli.interval_ms {
        config.display_test.interval_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

async fn run(config: TroubadourConfig) -> Result<i32> {
    let wizard = Wizard::new(
        &config,
        Arc::new(SystemProbe::new()),
        Arc::new(SystemPower::new(config.escalation.clone())),
    );

    let mut presenter = TuiPresenter::start()?;
    let result = wizard.run(&mut presenter).await;
    let restored = presenter.restore();

    let outcome = result?;
    restored?;

    if let Some(path) = outcome.session.log_path() {
        println!("Qualification record: {}", path.display());
    }
    if let Some(failure) = outcome.session.failure() {
        eprintln!("troubadourctl: {}", failure.message);
    }
    let code = errors::exit_code(&outcome);
    info!(
        code,
        sessions = outcome.sessions_run,
        phase = %outcome.session.phase(),
        "troubadourctl finished"
    );
    Ok(code)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("troubadourctl: {:#}", e);
            std::process::exit(EXIT_GENERAL_ERROR);
        }
    };

    if !cli.skip_privilege_check && !privilege::is_root() {
        eprintln!("troubadourctl must be run as root (try: sudo troubadourctl)");
        std::process::exit(EXIT_NOT_PRIVILEGED);
    }

    let trace_file = logging::init(&config.log, cli.verbose);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        trace_file = ?trace_file,
        record_dir = %config.record.dir.display(),
        "troubadourctl starting"
    );

    let code = match run(config).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "troubadourctl aborted");
            eprintln!("troubadourctl: {:#}", e);
            EXIT_GENERAL_ERROR
        }
    };
    std::process::exit(code);
}
