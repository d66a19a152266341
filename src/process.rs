use std::fmt;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::info;

/// A program plus its arguments, kept separate so no shell quoting is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            if a.contains(' ') {
                write!(f, " \"{}\"", a)?;
            } else {
                write!(f, " {}", a)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(c) => write!(f, "exit code {}", c),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Runs external tools (git, docfx) to completion.
pub trait ProcessRunner {
    /// Blocks until the process exits. `Err` only when it could not be started.
    fn invoke(&self, invocation: &Invocation, working_dir: &Path) -> Result<ExitStatus>;
}

/// Spawns real processes, inheriting stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn invoke(&self, invocation: &Invocation, working_dir: &Path) -> Result<ExitStatus> {
        info!("Running {} (in {:?})", invocation, working_dir);
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(working_dir)
            .status()
            .with_context(|| format!("Failed to start {}", invocation.program))?;
        Ok(ExitStatus {
            code: status.code(),
        })
    }
}
