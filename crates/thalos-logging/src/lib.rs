//! ---
//! thalos_section: "03-logging"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Structured logging adapters and sinks."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
#![warn(missing_docs)]
//! Tracing setup and structured lifecycle logging for Thalos.
//!
//! Nothing in this crate installs itself: the process entry point calls
//! [`init_tracing`] (or [`init`] in tests and short-lived tools) and keeps the
//! returned [`LoggingGuard`] alive for as long as logs should be flushed.
//! Components that log lifecycle events receive a [`LogContext`] from their
//! owner instead of reaching for a global.

use anyhow::Result;
use thalos_common::config::{LogFormat, LoggingConfig};
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

pub mod macros;

const LOG_ENV: &str = "THALOS_LOG";

/// Initialize a baseline tracing subscriber suitable for development and tests.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Keeps the non-blocking log writers alive. Dropping it flushes pending
/// records, so the entry point should hold it until exit.
#[must_use = "dropping the guard stops log delivery"]
#[derive(Debug)]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

/// Initialize the tracing subscriber from configuration and environment.
///
/// * `THALOS_LOG` overrides the filter directive, then `RUST_LOG`, finally
///   `info`.
/// * Stdout receives either pretty or structured JSON output per
///   [`LoggingConfig::format`].
/// * With [`LoggingConfig::file`] enabled, a daily rolling JSON file is
///   written under [`LoggingConfig::directory`].
///
/// If a global subscriber is already installed the call leaves it in place
/// and still returns a guard.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let mut guards = Vec::new();

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);

    let file_layer = if config.file {
        std::fs::create_dir_all(&config.directory)?;
        let prefix = config
            .file_prefix
            .clone()
            .unwrap_or_else(|| service_name.to_owned());
        let appender = daily(&config.directory, format!("{prefix}.log"));
        let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
        guards.push(file_guard);
        Some(
            fmt::layer()
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .json()
                .with_writer(file_writer)
                .boxed(),
        )
    } else {
        None
    };

    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!("invalid {LOG_ENV} directive ({err}); defaulting to info logging");
            EnvFilter::new("info")
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let stdout_layer = match config.format {
        LogFormat::StructuredJson => fmt::layer()
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .json()
            .with_writer(stdout_writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(stdout_writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .ok();

    info!(service = %service_name, format = ?config.format, file = config.file, "tracing initialised");
    Ok(LoggingGuard { _guards: guards })
}

/// Structured logging context handed to components by their owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    /// Component emitting the event (`orchestrator`, `api`, ...).
    pub component: String,
    /// Optional instance label distinguishing several owners of one component.
    pub instance: Option<String>,
}

impl LogContext {
    /// Create a context for the named component.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            instance: None,
        }
    }

    /// Attach an instance label.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new("thalos")
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation was rejected or failed.
    Fault,
}

impl SystemEventOutcome {
    /// Stable label written into the `outcome` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemEventOutcome::Success => "success",
            SystemEventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized system event. Successes log at INFO, faults at ERROR.
pub fn log_system_event(
    context: &LogContext,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let instance = context.instance.as_deref().unwrap_or("");
    match outcome {
        SystemEventOutcome::Success => info!(
            event,
            outcome = outcome.as_str(),
            component = %context.component,
            instance,
            message = %message
        ),
        SystemEventOutcome::Fault => error!(
            event,
            outcome = outcome.as_str(),
            component = %context.component,
            instance,
            message = %message
        ),
    }
}
