//! ---
//! thalos_section: "05-networking-external-interfaces"
//! thalos_subsection: "binary"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Command definitions and text rendering for the control CLI."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use anyhow::{anyhow, Error, Result};
use clap::Subcommand;
use thalos_core::{ClassOptions, CoreError, LifecycleState, Orchestrator};

/// Operations available both as one-shot commands and inside the shell.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Operation {
    /// Boot the orchestrator and bring subsystems online.
    Boot,
    /// Shut the orchestrator down and release its subsystems.
    Shutdown,
    /// Show name, version and lifecycle state.
    Status,
    /// Key-value store operations.
    #[command(subcommand)]
    Memory(MemoryCommand),
    /// Generate Python class or function skeletons.
    #[command(subcommand)]
    Codegen(CodegenCommand),
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum MemoryCommand {
    /// Store a new entry.
    Create { key: String, value: String },
    /// Print the value stored under a key.
    Read { key: String },
    /// Replace the value of an existing entry.
    Update { key: String, value: String },
    /// Remove an entry.
    Delete { key: String },
    /// List stored keys in sorted order.
    List,
    /// Print the number of stored entries.
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CodegenCommand {
    /// Class skeleton with one stub per method.
    Class {
        name: String,
        #[arg(long, num_args = 1.., value_name = "METHOD")]
        methods: Vec<String>,
        /// Omit the `__init__` stub.
        #[arg(long)]
        no_constructor: bool,
    },
    /// Function skeleton with the given parameters.
    Function {
        name: String,
        #[arg(long, num_args = 1.., value_name = "PARAM")]
        params: Vec<String>,
    },
}

/// Boot unless the command is `boot` itself, then execute it.
pub fn run_once(orchestrator: &mut Orchestrator, operation: Operation) -> Result<String> {
    if operation != Operation::Boot {
        orchestrator
            .boot()
            .map_err(|err| describe(&err, orchestrator.name()))?;
    }
    execute(orchestrator, operation)
}

/// Execute one operation and render the operator-facing text.
pub fn execute(orchestrator: &mut Orchestrator, operation: Operation) -> Result<String> {
    let name = orchestrator.name().to_owned();
    let fail = |err: CoreError| describe(&err, &name);

    match operation {
        Operation::Boot => {
            orchestrator.boot().map_err(fail)?;
            Ok(format!(
                "{} v{} booted successfully",
                orchestrator.name(),
                orchestrator.version()
            ))
        }
        Operation::Shutdown => {
            orchestrator.shutdown().map_err(fail)?;
            Ok(format!("{name} shut down"))
        }
        Operation::Status => Ok(render_status(orchestrator)),
        Operation::Memory(command) => memory(orchestrator, command).map_err(fail),
        Operation::Codegen(command) => codegen(orchestrator, command).map_err(fail),
    }
}

fn memory(orchestrator: &mut Orchestrator, command: MemoryCommand) -> Result<String, CoreError> {
    let store = orchestrator.store_mut()?;
    match command {
        MemoryCommand::Create { key, value } => {
            store.create(&key, value)?;
            Ok(format!("Created: {key}"))
        }
        MemoryCommand::Read { key } => {
            let value = store.read(&key)?;
            Ok(format!("{key} = {value}"))
        }
        MemoryCommand::Update { key, value } => {
            store.update(&key, value)?;
            Ok(format!("Updated: {key}"))
        }
        MemoryCommand::Delete { key } => {
            store.delete(&key)?;
            Ok(format!("Deleted: {key}"))
        }
        MemoryCommand::List => {
            let keys = store.list_keys();
            if keys.is_empty() {
                return Ok("No keys stored".to_owned());
            }
            let mut out = format!("Keys ({}):", keys.len());
            for key in keys {
                out.push_str("\n  ");
                out.push_str(&key);
            }
            Ok(out)
        }
        MemoryCommand::Count => Ok(format!("Total items: {}", store.count())),
    }
}

fn codegen(orchestrator: &Orchestrator, command: CodegenCommand) -> Result<String, CoreError> {
    let engine = orchestrator.templates()?;
    let code = match command {
        CodegenCommand::Class {
            name,
            methods,
            no_constructor,
        } => engine.generate_class_with(
            &name,
            methods.as_slice(),
            ClassOptions {
                include_constructor: !no_constructor,
            },
        )?,
        CodegenCommand::Function { name, params } => {
            engine.generate_function(&name, params.as_slice())?
        }
    };
    Ok(code.trim_end().to_owned())
}

fn render_status(orchestrator: &Orchestrator) -> String {
    let status = orchestrator.status();
    let subsystems = status
        .subsystems
        .iter()
        .map(|(name, online)| format!("{name}={}", if *online { "online" } else { "offline" }))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}\n  Version:    {}\n  Status:     {}\n  Subsystems: {}",
        status.name, status.version, status.state, subsystems
    )
}

/// Operator wording for core failures.
fn describe(err: &CoreError, name: &str) -> Error {
    match err {
        CoreError::Lifecycle {
            operation: "boot",
            current: LifecycleState::Operational,
            ..
        } => anyhow!("{name} already booted"),
        CoreError::Lifecycle {
            operation: "boot",
            current: LifecycleState::Shutdown,
            ..
        } => anyhow!("{name} has been shut down and cannot be booted again"),
        CoreError::Lifecycle { current, .. } => {
            anyhow!("{name} not operational (state: {current})")
        }
        CoreError::SubsystemUnavailable {
            state: LifecycleState::Created,
            ..
        } => anyhow!("{name} not initialized: run `boot` first"),
        CoreError::SubsystemUnavailable { subsystem, state } => {
            anyhow!("{subsystem} unavailable: {name} is {state}")
        }
        other => anyhow!("{other}"),
    }
}
