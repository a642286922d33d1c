//! ---
//! thalos_section: "01-core-functionality"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Primary orchestration and lifecycle management."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
//! Orchestrator lifecycle and the subsystems it owns.
//!
//! The [`Orchestrator`] is the only constructor of a [`KeyValueStore`] and a
//! [`TemplateEngine`] reachable by adapters. Both subsystems are still usable
//! on their own, which is how their unit tests exercise them.

pub mod error;
pub mod orchestrator;
pub mod store;
pub mod template;

pub use error::{CoreError, ErrorKind, ValidationError};
pub use orchestrator::{
    LifecycleState, Orchestrator, SharedOrchestrator, StatusSnapshot, Subsystem,
};
pub use store::KeyValueStore;
pub use template::{ClassOptions, Context, GenerationRecord, TemplateEngine};
