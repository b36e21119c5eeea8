//! # Command Runner
//!
//! Every external operation goes through the [`CommandRunner`] trait, which
//! runs one [`Invocation`] to completion and turns a non-zero exit into
//! [`Error::CommandFailed`]. The trait is the seam tests use to record
//! invocations instead of spawning processes.
//!
//! [`SystemRunner`] echoes each command as `  $ <argv>` (shell-quoted via
//! `shell-words`) before spawning it, and the child inherits stdout and
//! stderr so progress from `git` is visible live. Nothing is captured.
//!
//! There is no timeout: a hung child blocks the run until it is interrupted.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// A program, its arguments, and an optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// The command line in shell-quoted form, suitable for echoing and for
    /// error messages.
    pub fn command_line(&self) -> String {
        let words = std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|word| word.to_string_lossy());
        shell_words::join(words)
    }

    /// Arguments as lossy strings. Handy for assertions.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

/// Runs invocations to completion, blocking the caller.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

fn echo(invocation: &Invocation, suffix: &str) {
    let mut stdout = io::stdout().lock();
    // Echo failures (e.g. a closed pipe) must not stop provisioning.
    let _ = writeln!(stdout, "  $ {}{}", invocation.command_line(), suffix);
    let _ = stdout.flush();
}

/// Spawns real processes with inherited output streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        echo(invocation, "");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            debug!("running in {}", dir.display());
            command.current_dir(dir);
        }

        let status = command.status().map_err(|source| Error::CommandSpawn {
            command: invocation.command_line(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                command: invocation.command_line(),
                status: status.to_string(),
                code: status.code(),
            })
        }
    }
}

/// Echoes invocations without running anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        echo(invocation, "  (dry run)");
        Ok(())
    }
}
