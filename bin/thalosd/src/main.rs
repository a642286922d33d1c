//! ---
//! thalos_section: "01-core-functionality"
//! thalos_subsection: "binary"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Binary entrypoint for the Thalos daemon."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use thalos_api::{spawn_api_server, ApiServer};
use thalos_common::config::AppConfig;
use thalos_common::version::VersionInfo;
use thalos_core::Orchestrator;
use thalos_logging::{init_tracing, thalos_error, thalos_info, LogContext};
use tokio::signal;
use tracing::info;

const CONFIG_CANDIDATES: &[&str] = &["thalos.toml", "config/thalos.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Thalos daemon",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Boot the orchestrator and serve the API until ctrl-c")]
    Run,
    #[command(about = "Validate configuration and print the effective settings")]
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let version = VersionInfo::current();
    if cli.version {
        println!("thalosd {}", version.extended());
        return Ok(());
    }

    let loaded = AppConfig::resolve(cli.config.as_deref(), CONFIG_CANDIDATES)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::CheckConfig => {
            let rendered = toml::to_string_pretty(&loaded.config)
                .context("failed to render effective configuration")?;
            match &loaded.source {
                Some(path) => println!("# source: {}", path.display()),
                None => println!("# source: built-in defaults"),
            }
            print!("{rendered}");
            Ok(())
        }
        Commands::Run => {
            let _guard = init_tracing("thalosd", &loaded.config.logging)?;
            info!(
                banner = %version.banner(),
                source = ?loaded.source,
                "configuration loaded"
            );
            run_daemon(loaded.config).await
        }
    }
}

async fn run_daemon(config: AppConfig) -> Result<()> {
    let log = LogContext::new("thalosd");
    let orchestrator = Orchestrator::new(
        config.system.clone(),
        LogContext::new("orchestrator").with_instance("thalosd"),
    )
    .into_shared();

    if config.system.auto_boot {
        orchestrator.lock().boot()?;
    } else {
        thalos_info!(context = log, "auto_boot disabled; waiting for POST /boot");
    }

    let mut api_server: Option<ApiServer> = None;
    if config.api.enabled {
        match spawn_api_server(orchestrator.clone(), config.api.listen) {
            Ok(server) => api_server = Some(server),
            Err(err) => thalos_error!(context = log, "failed to start api server: {err:#}"),
        }
    } else {
        thalos_info!(context = log, "api server disabled by configuration");
    }

    let state = orchestrator.lock().state();
    thalos_info!(context = log, "daemon running ({state}); waiting for termination signal");
    signal::ctrl_c().await?;
    thalos_info!(context = log, "ctrl-c received; shutting down");

    if let Some(server) = api_server {
        server.shutdown().await?;
    }

    let mut orchestrator = orchestrator.lock();
    if orchestrator.is_booted() {
        orchestrator.shutdown()?;
    }
    Ok(())
}
