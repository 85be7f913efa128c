//! Command execution primitives with consistent error handling.

use std::path::Path;
use std::process::{Command, Output};

use serde::Serialize;

use crate::error::{Error, Result};

/// Run a command and return trimmed stdout on success.
///
/// Returns an error with stderr (or stdout fallback) if the command
/// exits non-zero or cannot be spawned.
pub fn run(program: &Path, args: &[String], context: &str) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::Other(format!("Failed to run {}: {}", context, e)))?;

    if !output.status.success() {
        return Err(Error::Other(format!(
            "{} failed: {}",
            context,
            error_text(&output)
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run a command in a specific directory.
pub fn run_in(dir: &Path, program: &str, args: &[&str], context: &str) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::Other(format!("Failed to run {}: {}", context, e)))?;

    if !output.status.success() {
        return Err(Error::Other(format!(
            "{} failed: {}",
            context,
            error_text(&output)
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

/// Captured output from command execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapturedOutput {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl CapturedOutput {
    pub fn new(stdout: String, stderr: String) -> Self {
        Self { stdout, stderr }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// Full capture of one synchronous invocation: exit code plus output.
///
/// Unlike [`run`], a non-zero exit is not an error here; callers that
/// treat the child as a black box read the code themselves.
#[derive(Debug, Clone, Serialize)]
pub struct CommandCapture {
    pub exit_code: i32,
    pub success: bool,
    #[serde(flatten)]
    pub output: CapturedOutput,
}

/// Run a command, capturing exit code and output without judging them.
///
/// Spawn failure is still an error: there is no exit code to report.
pub fn capture(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    envs: &[(String, String)],
) -> Result<CommandCapture> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    for (key, value) in envs {
        cmd.env(key, value);
    }

    let output = cmd
        .output()
        .map_err(|e| Error::Other(format!("Failed to spawn {}: {}", program, e)))?;

    Ok(CommandCapture {
        exit_code: output.status.code().unwrap_or(1),
        success: output.status.success(),
        output: CapturedOutput::new(
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn run_succeeds_with_valid_command() {
        let result = run(&PathBuf::from("echo"), &["hello".to_string()], "echo test");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "hello");
    }

    #[test]
    fn run_fails_with_invalid_command() {
        let result = run(&PathBuf::from("nonexistent_command_xyz"), &[], "test");
        assert!(result.is_err());
    }

    #[test]
    fn run_in_reports_context_on_failure() {
        let err = run_in(Path::new("/tmp"), "false", &[], "falsework").unwrap_err();
        assert!(err.to_string().contains("falsework"));
    }

    #[test]
    fn capture_preserves_nonzero_exit() {
        let result = capture("false", &[], None, &[]).unwrap();
        assert!(!result.success);
        assert_ne!(result.exit_code, 0);
    }

    #[test]
    fn capture_records_stdout() {
        let result = capture("echo", &["captured".to_string()], None, &[]).unwrap();
        assert!(result.success);
        assert_eq!(result.output.stdout.trim(), "captured");
    }

    #[test]
    fn capture_errors_on_spawn_failure() {
        assert!(capture("nonexistent_command_xyz", &[], None, &[]).is_err());
    }
}
