use async_trait::async_trait;
use tracing::debug;

use crate::error::{stack_label, DeployError};
use crate::process::{display_command, CommandRunner, StderrMode};

use super::{ApplyMode, ApplyOutput, InfraApply};

/// [`InfraApply`] backed by the `pulumi` CLI
pub struct PulumiCli {
    runner: CommandRunner,
    binary: String,
}

impl PulumiCli {
    pub fn new(runner: CommandRunner, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }
}

/// Append `-s <stack>` when a stack was named
fn with_stack<'a>(mut args: Vec<&'a str>, stack: Option<&'a str>) -> Vec<&'a str> {
    if let Some(stack) = stack {
        args.extend(["-s", stack]);
    }
    args
}

#[async_trait]
impl InfraApply for PulumiCli {
    async fn ensure_available(&self) -> Result<(), DeployError> {
        let found = self
            .runner
            .run(&self.binary, &["version"], StderrMode::Discard)
            .await
            .map(|out| out.success())
            .unwrap_or(false);

        if found {
            Ok(())
        } else {
            Err(DeployError::Prerequisite(
                "Pulumi CLI not found. Please install Pulumi CLI.".to_owned(),
            ))
        }
    }

    async fn apply(
        &self,
        stack: Option<&str>,
        mode: ApplyMode,
    ) -> Result<ApplyOutput, DeployError> {
        let mut args = vec!["up", "--yes"];
        if mode == ApplyMode::SkipPreview {
            args.push("--skip-preview");
        }
        let args = with_stack(args, stack);
        let command = display_command(&self.binary, &args);

        let out = self
            .runner
            .run(&self.binary, &args, StderrMode::Inherit)
            .await
            .map_err(|e| DeployError::ApplyFailure {
                stack: stack_label(stack),
                reason: format!("could not run `{command}`: {e}"),
            })?;

        if !out.success() {
            return Err(DeployError::ApplyFailure {
                stack: stack_label(stack),
                reason: format!("`{command}` exited with {}", out.status),
            });
        }

        Ok(ApplyOutput {
            raw_output: out.stdout,
        })
    }

    async fn read_output(&self, stack: Option<&str>, key: &str) -> Result<String, DeployError> {
        let args = with_stack(vec!["stack", "output", key], stack);
        let missing = |reason: String| DeployError::OutputMissing {
            stack: stack_label(stack),
            key: key.to_owned(),
            reason,
        };

        let out = self
            .runner
            .run(&self.binary, &args, StderrMode::Discard)
            .await
            .map_err(|e| missing(format!("could not run `{}`: {e}", self.binary)))?;

        if !out.success() {
            return Err(missing(format!(
                "`{}` exited with {}",
                display_command(&self.binary, &args),
                out.status
            )));
        }

        let value = out.stdout.trim();
        if value.is_empty() {
            return Err(missing("empty output".to_owned()));
        }

        debug!(stack = %stack_label(stack), key, "read stack output");

        Ok(value.to_owned())
    }

    async fn preview(&self, stack: Option<&str>) -> Result<ApplyOutput, DeployError> {
        let args = with_stack(vec!["preview"], stack);
        let command = display_command(&self.binary, &args);

        let out = self
            .runner
            .run(&self.binary, &args, StderrMode::Inherit)
            .await
            .map_err(|e| DeployError::PreviewFailure {
                stack: stack_label(stack),
                reason: format!("could not run `{command}`: {e}"),
            })?;

        if !out.success() {
            return Err(DeployError::PreviewFailure {
                stack: stack_label(stack),
                reason: format!("`{command}` exited with {}", out.status),
            });
        }

        Ok(ApplyOutput {
            raw_output: out.stdout,
        })
    }
}
