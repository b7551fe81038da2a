//! Child process execution for extraction and build actions

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

/// Exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    /// `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl ExitStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code with signals folded into `-1`
    pub fn code_or_signal(&self) -> i32 {
        self.code.unwrap_or(-1)
    }
}

/// Runs a shell command string and reports how it exited
#[async_trait::async_trait]
pub trait ProcessExecutor: Send + Sync {
    async fn run(&self, command: &str) -> Result<ExitStatus, ExecutionError>;
}

/// Executes commands through `sh -c`, inheriting stdio
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    timeout: Option<Duration>,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn command(script: &str) -> TokioCommand {
        let mut cmd = TokioCommand::new("sh");
        cmd.arg("-c")
            .arg(script)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait::async_trait]
impl ProcessExecutor for ShellExecutor {
    async fn run(&self, command: &str) -> Result<ExitStatus, ExecutionError> {
        tracing::debug!("Executing: {}", command);

        let spawn_error = |source| ExecutionError::Spawn {
            command: command.to_string(),
            source,
        };

        let mut child = Self::command(command).spawn().map_err(spawn_error)?;

        let status = match self.timeout {
            Some(limit) => timeout(limit, child.wait())
                .await
                .map_err(|_| ExecutionError::Timeout {
                    command: command.to_string(),
                    timeout: limit,
                })?
                .map_err(spawn_error)?,
            None => child.wait().await.map_err(spawn_error)?,
        };

        Ok(ExitStatus {
            code: status.code(),
        })
    }
}
