//! ---
//! thalos_section: "01-core-functionality"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Shared primitives and utilities for the core runtime."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
//! Shared primitives for the Thalos workspace.
//! This crate exposes configuration loading, identifier validation, and
//! version metadata consumed by the core, the adapters, and the daemon.

pub mod config;
pub mod ident;
pub mod version;

pub use config::{ApiConfig, AppConfig, LogFormat, LoggingConfig, SystemConfig};
pub use version::VersionInfo;
