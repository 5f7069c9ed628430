//! This module provides thin wrappers around the platform shell.
//!
//! It runs commands and captures their output, lists running executables and
//! starts detached processes. Launch logic talks to it through the
//! [`ProcessRunner`] trait.

use log::{debug, warn};
use std::collections::HashSet;
use std::io::{self, BufRead, BufReader};
use std::process::{Command, Stdio};
use std::thread;

/// Command listing running processes, one row per process.
const PROCESS_LIST_COMMAND: &str = "tasklist";

/// Entries of the process list that never correspond to an executable.
const RESERVED_PROCESS_NAMES: [&str; 2] = ["System Idle Process", "System"];

/// Number of header lines preceding the rows when no separator row is present.
const HEADER_LINES: usize = 5;

/// Launching and inspecting processes.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    /// Starts `program` with `args` without waiting for it.
    fn launch_detached(&self, program: &str, args: &[String]) -> io::Result<()>;

    /// Names of the executables currently running.
    fn running_process_names(&self) -> io::Result<HashSet<String>>;
}

/// `ProcessRunner` acting on the real operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcesses;

impl ProcessRunner for SystemProcesses {
    fn launch_detached(&self, program: &str, args: &[String]) -> io::Result<()> {
        launch_detached(program, args)
    }

    fn running_process_names(&self) -> io::Result<HashSet<String>> {
        list_running_process_names()
    }
}

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

/// Runs `command` through the shell and returns its output lines joined by `\n`.
///
/// The exit status is not reported: a failing command simply yields whatever
/// it printed. Only failing to start the shell is an error. Output that is
/// not valid UTF-8 (console code pages) is decoded lossily.
///
/// # Example
///
/// ```
/// use steamlib::process::run_shell_capture;
///
/// let output = run_shell_capture("echo hello").unwrap();
/// assert_eq!(output.trim(), "hello");
/// ```
pub fn run_shell_capture(command: &str) -> io::Result<String> {
    let mut child = shell_command(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let mut lines = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        let mut reader = BufReader::new(stdout);
        let mut raw = Vec::new();
        while reader.read_until(b'\n', &mut raw)? > 0 {
            let line = String::from_utf8_lossy(&raw);
            lines.push(line.trim_end_matches(['\n', '\r']).to_string());
            raw.clear();
        }
    }

    let status = child.wait()?;
    if !status.success() {
        debug!("`{}` exited with {}", command, status);
    }

    Ok(lines.join("\n"))
}

/// Lists the names of running executables.
pub fn list_running_process_names() -> io::Result<HashSet<String>> {
    let output = run_shell_capture(PROCESS_LIST_COMMAND)?;
    Ok(parse_process_list(&output))
}

/// Extracts executable names from tabular process-list output.
///
/// The header block ends with a row of `=` column separators; when that row is
/// missing the first [`HEADER_LINES`] lines are treated as header. Columns are
/// separated by runs of at least two spaces, so names containing single
/// spaces stay intact. Reserved system entries are dropped wherever they
/// appear.
pub fn parse_process_list(output: &str) -> HashSet<String> {
    let lines: Vec<&str> = output.lines().collect();
    let skip = lines
        .iter()
        .position(|line| line.trim_start().starts_with('='))
        .map(|separator| separator + 1)
        .unwrap_or(HEADER_LINES);

    lines
        .iter()
        .skip(skip)
        .filter_map(|line| line.split("  ").next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| !is_reserved_process(name))
        .map(str::to_string)
        .collect()
}

fn is_reserved_process(name: &str) -> bool {
    name.starts_with(RESERVED_PROCESS_NAMES[0]) || name == RESERVED_PROCESS_NAMES[1]
}

/// Starts `program` directly, without a shell, and returns immediately.
///
/// Arguments are passed as separate argv entries, so paths with spaces need
/// no quoting. Nothing about the started process is reported back; only
/// failing to spawn it is an error. The child is reaped on a background
/// thread once it exits.
pub fn launch_detached(program: &str, args: &[String]) -> io::Result<()> {
    debug!("Launching `{}` {:?}", program, args);
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            warn!("Failed to launch `{}`: {}", program, e);
            e
        })?;

    thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}
