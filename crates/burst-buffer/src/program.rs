//! Bounded invocation of the site-provided state program.

use crate::error::PluginError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramOutput {
    pub stdout: String,
}

/// Abstraction over the external program so tests can inject canned
/// output instead of forking.
#[async_trait]
pub trait StateProgram: Send + Sync {
    async fn run(&self, subcommand: &str) -> Result<ProgramOutput, PluginError>;
}

/// Real implementation: `<program> <subcommand>` with a hard timeout.
/// The child is killed when the timeout elapses.
pub struct ExternalProgram {
    path: PathBuf,
    timeout: Duration,
}

impl ExternalProgram {
    pub fn new(path: PathBuf, timeout: Duration) -> Self {
        Self { path, timeout }
    }
}

#[async_trait]
impl StateProgram for ExternalProgram {
    async fn run(&self, subcommand: &str) -> Result<ProgramOutput, PluginError> {
        let program = self.path.display().to_string();
        let child = Command::new(&self.path)
            .arg(subcommand)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PluginError::ProgramSpawn {
                program: program.clone(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| PluginError::ProgramTimeout {
                program: program.clone(),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|source| PluginError::ProgramSpawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            let status = output.status.code().unwrap_or(-1);
            tracing::error!(%program, status, "state program failed");
            return Err(PluginError::ProgramFailed { program, status });
        }
        Ok(ProgramOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_runs_real_command() {
        let program = ExternalProgram::new(PathBuf::from("/bin/echo"), Duration::from_secs(5));
        let out = program.run("get_sys_state").await.unwrap();
        assert_eq!(out.stdout.trim(), "get_sys_state");
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let program = ExternalProgram::new(
            PathBuf::from("/nonexistent/bb_state"),
            Duration::from_secs(1),
        );
        let err = program.run("get_sys_state").await.unwrap_err();
        assert!(matches!(err, PluginError::ProgramSpawn { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let program = ExternalProgram::new(PathBuf::from("/bin/sleep"), Duration::from_millis(50));
        let err = program.run("10").await.unwrap_err();
        assert!(matches!(err, PluginError::ProgramTimeout { .. }));
    }
}
