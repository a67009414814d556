//! External command execution.
//!
//! The package manager is reached through [`CommandRunner`] so that tests can
//! substitute a fake and never spawn real processes.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Creates a successful output with the given stdout.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Creates a failed output with the given exit code and stderr.
    #[must_use]
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns `true` if the command exited with code 0.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    /// Describes why the command failed, preferring its stderr.
    #[must_use]
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.status {
            Some(code) => format!("exited with code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs external programs.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` to completion and captures its output.
    ///
    /// A program that cannot be found must surface as an
    /// [`std::io::ErrorKind::NotFound`] error.
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput>;
}

/// Runs commands as child processes through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    /// Creates a new runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_prefers_stderr() {
        let output = CommandOutput::failure(1, "  npm ERR! code E404\n");
        assert_eq!(output.failure_reason(), "npm ERR! code E404");
    }

    #[test]
    fn test_failure_reason_falls_back_to_code() {
        let output = CommandOutput::failure(254, "");
        assert_eq!(output.failure_reason(), "exited with code 254");

        let killed = CommandOutput {
            status: None,
            ..CommandOutput::default()
        };
        assert_eq!(killed.failure_reason(), "terminated by signal");
    }

    #[test]
    fn test_is_success() {
        assert!(CommandOutput::success("{}").is_success());
        assert!(!CommandOutput::failure(1, "").is_success());
    }

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let runner = TokioCommandRunner::new();
        let err = runner
            .run("npmplug-definitely-missing-binary", &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_output_and_status() {
        let runner = TokioCommandRunner::new();
        let args = vec![
            "-c".to_string(),
            "echo out; echo err >&2; exit 3".to_string(),
        ];

        let output = runner.run("sh", &args).await.unwrap();
        assert_eq!(output.status, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }
}
