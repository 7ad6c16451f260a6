use log::{debug, trace};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error_handling::types::RotationError;

/// Captured result of one finished external command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandOutput {
    /// Turns a non-zero exit into [`RotationError::NonZeroExit`].
    pub fn into_success(self) -> Result<Self, RotationError> {
        if self.success {
            Ok(self)
        } else {
            Err(RotationError::NonZeroExit {
                code: self.status_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs the identity-control commands.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Runs `program` with `args`, killing it if it is still running after `timeout`.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, RotationError>;
}

/// Spawns real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, RotationError> {
        debug!("Running `{} {}`", program, args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| RotationError::SpawnFailed(format!("{}: {}", program, e)))?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            // dropping the future drops the child, which kills it
            Err(_) => {
                return Err(RotationError::Timeout {
                    program: program.to_string(),
                    secs: timeout.as_secs(),
                })
            }
        };

        let result = CommandOutput {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        };
        trace!("`{}` exited with {:?}", program, result.status_code);
        Ok(result)
    }
}
