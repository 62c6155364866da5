use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use bluegreen_common::{constants::PASSPHRASE_ENV_VAR, Secret};
use tokio::process::Command;
use tracing::{debug, trace};

/// What a finished child process left behind. Stderr is never captured.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// How the child's stderr should be wired up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StderrMode {
    /// Let the tool talk to the operator directly
    Inherit,
    /// Silence it, for probes whose failure is an expected answer
    Discard,
}

/// Runs external tools one at a time, with the stack passphrase injected into
/// every child's environment.
#[derive(Clone)]
pub struct CommandRunner {
    passphrase: Option<Secret<String>>,
    working_dir: Option<PathBuf>,
}

impl CommandRunner {
    pub fn new(passphrase: Option<Secret<String>>) -> Self {
        Self {
            passphrase,
            working_dir: None,
        }
    }

    /// Start every child in `dir` instead of the current directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Run `program` to completion and capture its stdout.
    ///
    /// Only fails if the process could not be started. A non-zero exit is reported
    /// through [`ProcessOutput::status`] so callers can map it to their own error.
    pub async fn run(
        &self,
        program: &str,
        args: &[&str],
        stderr: StderrMode,
    ) -> std::io::Result<ProcessOutput> {
        debug!(program, ?args, "running command");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(match stderr {
                StderrMode::Inherit => Stdio::inherit(),
                StderrMode::Discard => Stdio::null(),
            });
        if let Some(ref passphrase) = self.passphrase {
            cmd.env(PASSPHRASE_ENV_VAR, passphrase.expose());
        }
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        trace!(program, status = %output.status, stdout = %stdout, "command finished");

        Ok(ProcessOutput {
            status: output.status,
            stdout,
        })
    }
}

/// Human readable rendering of a command line, for error messages
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
