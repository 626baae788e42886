//! Execution of external command lines
//!
//! The package manager is always reached through a [`CommandRunner`]. The
//! [`SystemRunner`] hands the command line to the platform shell with inherited
//! stdio, and the [`RecordingRunner`] only records what would have run.

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Runs a command line to completion
pub trait CommandRunner {
    /// Execute `command_line`, failing when the process cannot be spawned or
    /// exits with a non-zero status
    fn execute(&self, command_line: &str) -> Result<()>;
}

/// Runs commands through `sh -c` (or `cmd /C` on Windows)
#[derive(Debug, Clone)]
pub struct SystemRunner {
    working_dir: PathBuf,
}

impl SystemRunner {
    pub fn new<P: Into<PathBuf>>(working_dir: P) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    fn shell_command(command_line: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command_line]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command_line]);
            cmd
        }
    }
}

impl CommandRunner for SystemRunner {
    fn execute(&self, command_line: &str) -> Result<()> {
        debug!(
            "Running `{}` in {}",
            command_line,
            self.working_dir.display()
        );
        let status = Self::shell_command(command_line)
            .current_dir(&self.working_dir)
            .status()
            .map_err(|e| Error::ExternalCommand {
                command: command_line.to_string(),
                status: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::ExternalCommand {
                command: command_line.to_string(),
                status: status.to_string(),
            })
        }
    }
}

/// Records command lines instead of running them
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: RefCell<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every command line containing `needle`
    pub fn failing_on(needle: &str) -> Self {
        Self {
            commands: RefCell::new(Vec::new()),
            fail_on: Some(needle.to_string()),
        }
    }

    /// Command lines received so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn execute(&self, command_line: &str) -> Result<()> {
        self.commands.borrow_mut().push(command_line.to_string());
        match &self.fail_on {
            Some(needle) if command_line.contains(needle.as_str()) => Err(Error::ExternalCommand {
                command: command_line.to_string(),
                status: "exit status: 1".to_string(),
            }),
            _ => Ok(()),
        }
    }
}
