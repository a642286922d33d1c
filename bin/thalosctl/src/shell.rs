//! ---
//! thalos_section: "05-networking-external-interfaces"
//! thalos_subsection: "binary"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Interactive shell driving one orchestrator across many commands."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use thalos_core::Orchestrator;
use tracing::debug;

use crate::commands::{execute, Operation};

const PROMPT: &str = "thalos> ";

#[derive(Debug, Parser)]
#[command(name = "thalos", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    operation: Operation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Read commands from `input` until `exit`, `quit`, or end of input.
///
/// Unlike one-shot mode, the orchestrator persists between lines; it is shut
/// down on exit if still operational. Used for piped stdin and in tests.
pub fn run<R: BufRead, W: Write>(
    orchestrator: &mut Orchestrator,
    mut input: R,
    mut output: W,
    auto_boot: bool,
) -> Result<()> {
    start(orchestrator, &mut output, auto_boot)?;

    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        if handle_line(orchestrator, &line, &mut output)? == Flow::Exit {
            break;
        }
    }

    finish(orchestrator, &mut output)
}

/// Terminal session with line editing and in-memory history.
pub fn run_interactive(orchestrator: &mut Orchestrator, auto_boot: bool) -> Result<()> {
    let mut output = io::stdout();
    start(orchestrator, &mut output, auto_boot)?;

    let config = Config::builder().auto_add_history(true).build();
    let mut editor = DefaultEditor::with_config(config)?;
    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if handle_line(orchestrator, &line, &mut output)? == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                debug!(error = %err, "readline failed; leaving shell");
                break;
            }
        }
    }

    finish(orchestrator, &mut output)
}

fn start<W: Write>(orchestrator: &mut Orchestrator, output: &mut W, auto_boot: bool) -> Result<()> {
    writeln!(
        output,
        "{} interactive shell. Type `help` for commands, `exit` to quit.",
        orchestrator.name()
    )?;
    if auto_boot {
        report(output, execute(orchestrator, Operation::Boot))?;
    }
    Ok(())
}

fn finish<W: Write>(orchestrator: &mut Orchestrator, output: &mut W) -> Result<()> {
    if orchestrator.is_booted() {
        report(output, execute(orchestrator, Operation::Shutdown))?;
    }
    Ok(())
}

/// Tokenise one line with POSIX shell quoting and run it.
fn handle_line<W: Write>(orchestrator: &mut Orchestrator, line: &str, output: &mut W) -> Result<Flow> {
    let Some(words) = shlex::split(line) else {
        writeln!(output, "error: unterminated quote or trailing escape")?;
        return Ok(Flow::Continue);
    };
    match words.first().map(String::as_str) {
        None => return Ok(Flow::Continue),
        Some("exit" | "quit") => return Ok(Flow::Exit),
        Some(_) => {}
    }

    match ShellLine::try_parse_from(&words) {
        Ok(parsed) => report(output, execute(orchestrator, parsed.operation))?,
        Err(err) => write!(output, "{}", err.render())?,
    }
    Ok(Flow::Continue)
}

fn report<W: Write>(output: &mut W, result: Result<String>) -> Result<()> {
    match result {
        Ok(text) => writeln!(output, "{text}")?,
        Err(err) => writeln!(output, "error: {err}")?,
    }
    Ok(())
}
