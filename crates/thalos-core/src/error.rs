//! ---
//! thalos_section: "01-core-functionality"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Typed error taxonomy for the orchestrator and its subsystems."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::orchestrator::{LifecycleState, Subsystem};

/// Malformed key or identifier.
///
/// `value` carries the rejected input when there is one; `details` holds
/// rule parameters such as the expected pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
    pub value: Option<String>,
    pub details: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
            value: None,
            details: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "invalid {} '{}': {}", self.field, value, self.reason),
            None => write!(f, "invalid {}: {}", self.field, self.reason),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Every failure the core can report. There is no catch-all variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("cannot {operation}: orchestrator is {current}, expected {expected}")]
    Lifecycle {
        operation: &'static str,
        current: LifecycleState,
        expected: LifecycleState,
    },
    #[error("{subsystem} subsystem not available: orchestrator is {state}")]
    SubsystemUnavailable {
        subsystem: Subsystem,
        state: LifecycleState,
    },
    #[error("key already exists: {key}")]
    KeyExists { key: String },
    #[error("key not found: {key}")]
    KeyNotFound { key: String },
    #[error("template already registered: {name}")]
    TemplateExists { name: String },
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },
    #[error("template {template} is missing context for: {}", missing.join(", "))]
    MissingContext {
        template: String,
        missing: Vec<String>,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("generation history is not enabled on this engine")]
    HistoryDisabled,
}

/// Coarse classification adapters translate into their own protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    LifecycleViolation,
    KeyConflict,
    KeyAbsence,
    TemplateConflict,
    TemplateAbsence,
    ContextIncompleteness,
    FormatInvalidity,
    HistoryDisabled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::LifecycleViolation => "lifecycle-violation",
            ErrorKind::KeyConflict => "key-conflict",
            ErrorKind::KeyAbsence => "key-absence",
            ErrorKind::TemplateConflict => "template-conflict",
            ErrorKind::TemplateAbsence => "template-absence",
            ErrorKind::ContextIncompleteness => "context-incompleteness",
            ErrorKind::FormatInvalidity => "format-invalidity",
            ErrorKind::HistoryDisabled => "history-disabled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Lifecycle { .. } | CoreError::SubsystemUnavailable { .. } => {
                ErrorKind::LifecycleViolation
            }
            CoreError::KeyExists { .. } => ErrorKind::KeyConflict,
            CoreError::KeyNotFound { .. } => ErrorKind::KeyAbsence,
            CoreError::TemplateExists { .. } => ErrorKind::TemplateConflict,
            CoreError::TemplateNotFound { .. } => ErrorKind::TemplateAbsence,
            CoreError::MissingContext { .. } => ErrorKind::ContextIncompleteness,
            CoreError::Validation(_) => ErrorKind::FormatInvalidity,
            CoreError::HistoryDisabled => ErrorKind::HistoryDisabled,
        }
    }

    /// Upper-case error code, e.g. `KEY_NOT_FOUND`.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Lifecycle { .. } => "LIFECYCLE",
            CoreError::SubsystemUnavailable { .. } => "NOT_BOOTED",
            CoreError::KeyExists { .. } => "KEY_EXISTS",
            CoreError::KeyNotFound { .. } => "KEY_NOT_FOUND",
            CoreError::TemplateExists { .. } => "TEMPLATE_EXISTS",
            CoreError::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
            CoreError::MissingContext { .. } => "MISSING_CONTEXT",
            CoreError::Validation(_) => "VALIDATION",
            CoreError::HistoryDisabled => "HISTORY_DISABLED",
        }
    }

    /// `[CODE] message`, the form used in operator-facing text.
    pub fn formatted(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}
