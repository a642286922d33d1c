//! ---
//! thalos_section: "01-core-functionality"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Primary orchestration and lifecycle management."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use thalos_common::config::SystemConfig;
use thalos_logging::{log_system_event, thalos_debug, LogContext, SystemEventOutcome};

use crate::error::CoreError;
use crate::store::KeyValueStore;
use crate::template::TemplateEngine;

/// Orchestrator shared between request handlers.
pub type SharedOrchestrator = Arc<Mutex<Orchestrator>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Created,
    Operational,
    Shutdown,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Created => "created",
            LifecycleState::Operational => "operational",
            LifecycleState::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subsystems owned by the orchestrator while operational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Memory,
    Codegen,
}

impl Subsystem {
    pub const ALL: [Subsystem; 2] = [Subsystem::Memory, Subsystem::Codegen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Memory => "memory",
            Subsystem::Codegen => "codegen",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view returned by [`Orchestrator::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub name: String,
    pub version: String,
    pub state: LifecycleState,
    pub booted: bool,
    /// Availability per subsystem, keyed by [`Subsystem::as_str`]. Adapters
    /// are not listed; the orchestrator holds no handle to them.
    pub subsystems: BTreeMap<String, bool>,
}

#[derive(Debug)]
struct Subsystems {
    store: KeyValueStore,
    templates: TemplateEngine,
}

impl Subsystems {
    fn build(config: &SystemConfig) -> Self {
        let templates = if config.track_history {
            TemplateEngine::with_history()
        } else {
            TemplateEngine::new()
        };
        Self {
            store: KeyValueStore::new(),
            templates,
        }
    }
}

/// The subsystems only exist in the operational phase.
#[derive(Debug)]
enum Lifecycle {
    Created,
    Operational(Subsystems),
    Shutdown,
}

/// Owns the lifecycle and the subsystems for one Thalos instance.
///
/// Adapters never construct a store or an engine themselves: they borrow
/// them through [`store_mut`](Self::store_mut) and
/// [`templates_mut`](Self::templates_mut), and those borrows end before the
/// orchestrator can be shut down.
#[derive(Debug)]
pub struct Orchestrator {
    config: SystemConfig,
    lifecycle: Lifecycle,
    log: LogContext,
}

impl Orchestrator {
    pub fn new(config: SystemConfig, log: LogContext) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::Created,
            log,
        }
    }

    /// Wrap for sharing across request handlers.
    pub fn into_shared(self) -> SharedOrchestrator {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> LifecycleState {
        match self.lifecycle {
            Lifecycle::Created => LifecycleState::Created,
            Lifecycle::Operational(_) => LifecycleState::Operational,
            Lifecycle::Shutdown => LifecycleState::Shutdown,
        }
    }

    pub fn is_booted(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Operational(_))
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Build fresh subsystems and become operational.
    pub fn boot(&mut self) -> Result<(), CoreError> {
        if !matches!(self.lifecycle, Lifecycle::Created) {
            return Err(self.reject("boot", LifecycleState::Created));
        }
        self.lifecycle = Lifecycle::Operational(Subsystems::build(&self.config));
        thalos_debug!(
            context = self.log,
            "subsystems built (history tracking: {})",
            self.config.track_history
        );
        log_system_event(
            &self.log,
            "orchestrator.boot",
            &format!("{} v{} operational", self.config.name, self.config.version),
            SystemEventOutcome::Success,
        );
        Ok(())
    }

    /// Drop the subsystems and their contents. Terminal.
    pub fn shutdown(&mut self) -> Result<(), CoreError> {
        if !self.is_booted() {
            return Err(self.reject("shutdown", LifecycleState::Operational));
        }
        self.lifecycle = Lifecycle::Shutdown;
        log_system_event(
            &self.log,
            "orchestrator.shutdown",
            &format!("{} shut down", self.config.name),
            SystemEventOutcome::Success,
        );
        Ok(())
    }

    pub fn status(&self) -> StatusSnapshot {
        let booted = self.is_booted();
        StatusSnapshot {
            name: self.config.name.clone(),
            version: self.config.version.clone(),
            state: self.state(),
            booted,
            subsystems: Subsystem::ALL
                .iter()
                .map(|subsystem| (subsystem.as_str().to_owned(), booted))
                .collect(),
        }
    }

    pub fn store(&self) -> Result<&KeyValueStore, CoreError> {
        match &self.lifecycle {
            Lifecycle::Operational(subsystems) => Ok(&subsystems.store),
            _ => Err(unavailable(&self.log, Subsystem::Memory, self.state())),
        }
    }

    pub fn store_mut(&mut self) -> Result<&mut KeyValueStore, CoreError> {
        let state = self.state();
        match &mut self.lifecycle {
            Lifecycle::Operational(subsystems) => Ok(&mut subsystems.store),
            _ => Err(unavailable(&self.log, Subsystem::Memory, state)),
        }
    }

    pub fn templates(&self) -> Result<&TemplateEngine, CoreError> {
        match &self.lifecycle {
            Lifecycle::Operational(subsystems) => Ok(&subsystems.templates),
            _ => Err(unavailable(&self.log, Subsystem::Codegen, self.state())),
        }
    }

    pub fn templates_mut(&mut self) -> Result<&mut TemplateEngine, CoreError> {
        let state = self.state();
        match &mut self.lifecycle {
            Lifecycle::Operational(subsystems) => Ok(&mut subsystems.templates),
            _ => Err(unavailable(&self.log, Subsystem::Codegen, state)),
        }
    }

    fn reject(&self, operation: &'static str, expected: LifecycleState) -> CoreError {
        let err = CoreError::Lifecycle {
            operation,
            current: self.state(),
            expected,
        };
        log_system_event(
            &self.log,
            &format!("orchestrator.{operation}"),
            &err.to_string(),
            SystemEventOutcome::Fault,
        );
        err
    }
}

fn unavailable(log: &LogContext, subsystem: Subsystem, state: LifecycleState) -> CoreError {
    thalos_debug!(context = log, "{subsystem} requested while {state}");
    CoreError::SubsystemUnavailable { subsystem, state }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(SystemConfig::default(), LogContext::new("orchestrator"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn starts_created_with_nothing_available() {
        let orchestrator = Orchestrator::default();
        assert_eq!(orchestrator.state(), LifecycleState::Created);
        assert!(!orchestrator.is_booted());
        assert!(matches!(
            orchestrator.store(),
            Err(CoreError::SubsystemUnavailable {
                subsystem: Subsystem::Memory,
                state: LifecycleState::Created,
            })
        ));
        assert!(orchestrator.templates().is_err());
    }

    #[test]
    fn boot_then_shutdown() {
        let mut orchestrator = Orchestrator::default();
        orchestrator.boot().unwrap();
        assert_eq!(orchestrator.state(), LifecycleState::Operational);
        orchestrator.store_mut().unwrap().create("k", "v").unwrap();
        assert_eq!(orchestrator.store().unwrap().read("k").unwrap(), "v");

        orchestrator.shutdown().unwrap();
        assert_eq!(orchestrator.state(), LifecycleState::Shutdown);
        let err = orchestrator.store_mut().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LifecycleViolation);
        assert!(orchestrator.templates_mut().is_err());
    }

    #[test]
    fn illegal_transitions_leave_state_alone() {
        let mut orchestrator = Orchestrator::default();
        assert_eq!(
            orchestrator.shutdown().unwrap_err(),
            CoreError::Lifecycle {
                operation: "shutdown",
                current: LifecycleState::Created,
                expected: LifecycleState::Operational,
            }
        );
        assert_eq!(orchestrator.state(), LifecycleState::Created);

        orchestrator.boot().unwrap();
        orchestrator.store_mut().unwrap().create("kept", "1").unwrap();
        assert!(orchestrator.boot().is_err());
        assert_eq!(orchestrator.store().unwrap().read("kept").unwrap(), "1");

        orchestrator.shutdown().unwrap();
        assert!(orchestrator.boot().is_err());
        assert!(orchestrator.shutdown().is_err());
        assert_eq!(orchestrator.state(), LifecycleState::Shutdown);
    }

    #[test]
    fn status_reflects_lifecycle() {
        let config = SystemConfig {
            name: "Test Prime".into(),
            version: "2.1".into(),
            ..SystemConfig::default()
        };
        let mut orchestrator = Orchestrator::new(config, LogContext::new("orchestrator"));
        let status = orchestrator.status();
        assert_eq!(status.name, "Test Prime");
        assert_eq!(status.version, "2.1");
        assert!(!status.booted);
        assert_eq!(status.subsystems.get("memory"), Some(&false));

        orchestrator.boot().unwrap();
        let status = orchestrator.status();
        assert_eq!(status.state, LifecycleState::Operational);
        assert_eq!(
            status.subsystems.keys().collect::<Vec<_>>(),
            vec!["codegen", "memory"]
        );
        assert!(status.subsystems.values().all(|available| *available));
    }

    #[test]
    fn history_follows_configuration() {
        let config = SystemConfig {
            track_history: true,
            ..SystemConfig::default()
        };
        let mut orchestrator = Orchestrator::new(config, LogContext::default());
        orchestrator.boot().unwrap();
        assert!(orchestrator.templates().unwrap().tracks_history());

        let mut plain = Orchestrator::default();
        plain.boot().unwrap();
        assert!(!plain.templates().unwrap().tracks_history());
    }

    #[test]
    fn status_serializes_lowercase_state() {
        let mut orchestrator = Orchestrator::default();
        orchestrator.boot().unwrap();
        let json = serde_json::to_value(orchestrator.status()).unwrap();
        assert_eq!(json["state"], "operational");
        assert_eq!(json["subsystems"]["codegen"], true);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn subsystem_access_is_logged_with_component() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut orchestrator = Orchestrator::new(
                SystemConfig::default(),
                LogContext::new("orchestrator").with_instance("unit"),
            );
            assert!(orchestrator.templates().is_err());
            orchestrator.boot().unwrap();
        });

        let output = String::from_utf8(logs.0.lock().clone()).unwrap();
        assert!(output.contains("codegen requested while created"), "{output}");
        assert!(output.contains("subsystems built (history tracking: false)"), "{output}");
        assert!(output.contains("component=orchestrator"), "{output}");
    }
}
