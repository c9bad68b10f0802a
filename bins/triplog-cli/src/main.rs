// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! triplog CLI
//!
//! Hosts the ledger dispatcher against a local JSON snapshot. Payloads are
//! written to stdout; logs go to stderr.

mod file_ledger;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use triplog_app_core::config::ConfigService;
use triplog_app_core::prefs::{CliPrefs, CLI_PREFS_KEY};
use triplog_config_fs::FsConfigStore;
use triplog_core::dispatch::RECORD_BUSES_FROM_CSV;

use crate::file_ledger::FileLedger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ledger snapshot file (overrides the saved preference)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Config directory (defaults to the platform config dir)
    #[arg(long, global = true, env = "TRIPLOG_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Invoke a ledger operation by name with positional arguments
    Invoke {
        /// Operation name, e.g. `recordBus`
        function: String,
        /// Positional arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List routed operations
    Ops,
    /// Show or update saved preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective preferences as JSON
    Show,
    /// Update one or more preferences
    Set {
        /// Default ledger snapshot file
        #[arg(long)]
        ledger_path: Option<String>,
        /// Default log level
        #[arg(long)]
        log_level: Option<String>,
        /// Header flag assumed when `recordBusesFromCSV` gets only a path
        #[arg(long)]
        default_has_header: Option<bool>,
    },
}

struct Settings {
    service: Option<ConfigService<FsConfigStore>>,
    prefs: CliPrefs,
    problem: Option<String>,
}

fn load_settings(config_dir: Option<&Path>) -> Settings {
    let store = match config_dir {
        Some(dir) => FsConfigStore::with_base(dir),
        None => FsConfigStore::new(),
    };
    let service = match store {
        Ok(store) => ConfigService::new(store),
        Err(err) => {
            return Settings {
                service: None,
                prefs: CliPrefs::default(),
                problem: Some(format!("config store unavailable: {err}")),
            }
        }
    };
    match service.load_or_default::<CliPrefs>(CLI_PREFS_KEY) {
        Ok(prefs) => Settings {
            service: Some(service),
            prefs,
            problem: None,
        },
        Err(err) => Settings {
            service: Some(service),
            prefs: CliPrefs::default(),
            problem: Some(format!("ignoring unreadable preferences: {err}")),
        },
    }
}

fn init_tracing(verbose: u8, prefs: &CliPrefs) -> Result<()> {
    let level = match verbose {
        0 => prefs.log_level.parse().unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn emit(bytes: &[u8]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(bytes)?;
    if !bytes.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn run_invoke(
    ledger_path: &Path,
    function: &str,
    mut args: Vec<String>,
    prefs: &CliPrefs,
) -> Result<()> {
    if function == RECORD_BUSES_FROM_CSV && args.len() == 1 {
        args.push(prefs.default_has_header.to_string());
    }
    let mut file = FileLedger::open(ledger_path)?;
    let mut tx = file.ledger_mut().begin();
    let payload = triplog_core::invoke(&mut tx, function, &args)
        .with_context(|| format!("{function} failed"))?;
    let written = tx.commit();
    if written > 0 {
        file.save()?;
        info!(function, written, ledger = %ledger_path.display(), "committed");
    }
    emit(&payload)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config_dir.as_deref());
    init_tracing(args.verbose, &settings.prefs)?;
    if let Some(problem) = &settings.problem {
        warn!("{problem}");
    }
    if let Some(service) = &settings.service {
        debug!(dir = %service.store().base().display(), "preferences loaded");
    }

    let ledger_path = args
        .ledger
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.prefs.ledger_path));

    match args.cmd {
        Command::Invoke { function, args } => {
            run_invoke(&ledger_path, &function, args, &settings.prefs)
        }
        Command::Ops => {
            let names: Vec<&str> = triplog_core::operations().collect();
            emit(names.join("\n").as_bytes())
        }
        Command::Config { action } => match action {
            ConfigAction::Show => emit(&serde_json::to_vec_pretty(&settings.prefs)?),
            ConfigAction::Set {
                ledger_path,
                log_level,
                default_has_header,
            } => {
                let Some(service) = &settings.service else {
                    bail!("no config store available; cannot save preferences");
                };
                let mut prefs = settings.prefs.clone();
                if let Some(path) = ledger_path {
                    prefs.ledger_path = path;
                }
                if let Some(level) = log_level {
                    if level.parse::<Level>().is_err() {
                        bail!("unknown log level {level:?}");
                    }
                    prefs.log_level = level;
                }
                if let Some(flag) = default_has_header {
                    prefs.default_has_header = flag;
                }
                service.save(CLI_PREFS_KEY, &prefs)?;
                emit(&serde_json::to_vec_pretty(&prefs)?)
            }
        },
    }
}
