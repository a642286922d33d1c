//! ---
//! thalos_section: "05-networking-external-interfaces"
//! thalos_subsection: "binary"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Control CLI for operators interacting with Thalos."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use thalos_common::config::AppConfig;
use thalos_common::version::VersionInfo;
use thalos_core::Orchestrator;
use thalos_logging::{self as logging, LogContext};

mod commands;
mod shell;

const CONFIG_CANDIDATES: &[&str] = &["thalos.toml", "config/thalos.toml"];

#[derive(Debug, Parser)]
#[command(
    name = "thalosctl",
    author,
    disable_version_flag = true,
    about = "Thalos orchestrator control utility",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,
    /// Configuration file (otherwise THALOS_CONFIG or ./thalos.toml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(flatten)]
    Operation(commands::Operation),
    /// Interactive session against a single orchestrator.
    Shell,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    if cli.version {
        println!("thalosctl {}", VersionInfo::current().extended());
        return Ok(());
    }
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = AppConfig::resolve(cli.config.as_deref(), CONFIG_CANDIDATES)?.config;
    let mut orchestrator = Orchestrator::new(config.system.clone(), LogContext::new("thalosctl"));

    match command {
        Commands::Operation(operation) => {
            let output = commands::run_once(&mut orchestrator, operation)?;
            println!("{output}");
        }
        Commands::Shell => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                shell::run_interactive(&mut orchestrator, config.system.auto_boot)?;
            } else {
                shell::run(
                    &mut orchestrator,
                    stdin.lock(),
                    io::stdout(),
                    config.system.auto_boot,
                )?;
            }
        }
    }
    Ok(())
}
