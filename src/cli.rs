//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_universe_adapter::CsvUniverseAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::validate_session_config;
use crate::domain::error::TraderError;
use crate::domain::session::{SessionReport, SessionSettings, WaitMode};
use crate::domain::universe::{resolve_universe, Universe, UniverseSource};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(
    name = "dipbuyer",
    about = "Buy the day's most-declined stocks through an Interactive Brokers gateway"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a trading session
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Validate and print the plan without connecting
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the resolved symbol universe
    Universe {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run { config, dry_run } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_trading_session(&config)
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Universe { config } => run_universe(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_session_settings(config: &dyn ConfigPort) -> Result<SessionSettings, TraderError> {
    let defaults = SessionSettings::default();

    let host = config
        .get_string("gateway", "host")
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| TraderError::ConfigMissing {
            section: "gateway".into(),
            key: "host".into(),
        })?;

    let port = u16::try_from(config.get_int("gateway", "port", i64::from(defaults.port)))
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| TraderError::ConfigInvalid {
            section: "gateway".into(),
            key: "port".into(),
            reason: "port must be between 1 and 65535".into(),
        })?;

    let client_id = i32::try_from(config.get_int("gateway", "client_id", 0))
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| TraderError::ConfigInvalid {
            section: "gateway".into(),
            key: "client_id".into(),
            reason: "client_id must be a non-negative integer".into(),
        })?;

    let wait_mode = match config.get_string("session", "wait_mode") {
        Some(s) => s
            .parse::<WaitMode>()
            .map_err(|reason| TraderError::ConfigInvalid {
                section: "session".into(),
                key: "wait_mode".into(),
                reason,
            })?,
        None => defaults.wait_mode,
    };

    Ok(SessionSettings {
        host,
        port,
        client_id,
        ready_timeout: config.get_secs("gateway", "ready_timeout_secs", 10.0),
        request_pacing: config.get_millis("session", "request_pacing_ms", 100),
        settle_timeout: config.get_secs("session", "settle_secs", 60.0),
        wait_mode,
    })
}

/// Relative universe files are looked up next to the config file.
pub fn load_universe(
    config: &dyn ConfigPort,
    config_path: &Path,
) -> Result<(Universe, UniverseSource), TraderError> {
    let base = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    resolve_universe(config, &CsvUniverseAdapter::new(base))
}

struct Prepared {
    settings: SessionSettings,
    universe: Universe,
}

fn prepare(config_path: &Path) -> Result<Prepared, ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    let fail = |e: TraderError| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    };

    validate_session_config(&adapter).map_err(fail)?;
    let settings = build_session_settings(&adapter).map_err(fail)?;
    let (universe, source) = load_universe(&adapter, config_path).map_err(fail)?;
    eprintln!("Universe: {} symbols from {}", universe.count(), source);

    Ok(Prepared { settings, universe })
}

fn run_dry_run(config_path: &Path) -> ExitCode {
    let prepared = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let s = &prepared.settings;

    eprintln!("\nSession plan:");
    eprintln!("  gateway:        {}:{} (client {})", s.host, s.port, s.client_id);
    eprintln!("  ready timeout:  {:?}", s.ready_timeout);
    eprintln!("  pacing:         {:?} between requests", s.request_pacing);
    eprintln!("  wait:           {:?}, up to {:?}", s.wait_mode, s.settle_timeout);
    eprintln!(
        "  requests:       {} market data, {} historical",
        prepared.universe.count(),
        prepared.universe.count()
    );
    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_trading_session(config_path: &Path) -> ExitCode {
    let prepared = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    #[cfg(feature = "ibkr")]
    {
        use crate::adapters::console_report::ConsoleReport;
        use crate::adapters::ibkr_adapter::IbkrGateway;
        use crate::domain::session::run_session;

        let gateway = IbkrGateway::new();
        let report = run_session(
            &gateway,
            &prepared.universe,
            &prepared.settings,
            &ConsoleReport,
        );
        print_summary(&report);
        ExitCode::SUCCESS
    }

    #[cfg(not(feature = "ibkr"))]
    {
        let _ = prepared;
        eprintln!("error: ibkr feature is required for run");
        ExitCode::from(1)
    }
}

pub fn print_summary(report: &SessionReport) {
    eprintln!("\n=== Session Summary ===");
    eprintln!("Gateway ready:    {}", if report.ready { "yes" } else { "no" });
    eprintln!("Observations:     {}", report.observations);
    eprintln!("Selected:         {}", report.selected.len());
    eprintln!("Orders placed:    {}", report.orders.len());
    eprintln!("Ticks received:   {}", report.ticks_received);
    eprintln!("Errors reported:  {}", report.errors_reported);
    if !report.missing.is_empty() {
        eprintln!("No data for:      {}", report.missing.join(", "));
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    match prepare(config_path) {
        Ok(_) => {
            eprintln!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

fn run_universe(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match load_universe(&adapter, config_path) {
        Ok((universe, source)) => {
            for symbol in &universe.symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols from {}", universe.count(), source);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
