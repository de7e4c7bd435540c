//! External process execution
//!
//! A thin wrapper over tokio's process support with the semantics the
//! provisioning pipeline needs: non-zero exit codes are results, not
//! errors. A missing executable or working directory reports exit 127,
//! a process that outlives its timeout is killed and reports exit 124.
//! Only genuine operating system faults surface as [`Error`] values.

use std::process::Stdio;
use std::time::Duration;

use camino::Utf8Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Exit code reported when the executable or working directory is missing
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code reported when a process exceeds its timeout
pub const EXIT_TIMED_OUT: i32 = 124;

/// Captured outcome of one external process invocation
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Process exit code (127 = not found, 124 = timed out)
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ProcessResult {
    /// Whether the process exited successfully
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Standard output with surrounding whitespace removed
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    fn not_found(message: String) -> Self {
        Self {
            exit_code: EXIT_NOT_FOUND,
            stdout: String::new(),
            stderr: message,
        }
    }

    fn timed_out(limit: Duration) -> Self {
        Self {
            exit_code: EXIT_TIMED_OUT,
            stdout: String::new(),
            stderr: format!("Process timed out after {} seconds", limit.as_secs()),
        }
    }
}

/// Run a command given as an argv vector, capturing stdout and stderr
///
/// The first element is the program, the rest are its arguments. The
/// command never inherits stdin.
pub async fn run(
    argv: &[&str],
    cwd: Option<&Utf8Path>,
    timeout: Option<Duration>,
) -> Result<ProcessResult> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::spawn("", std::io::Error::other("empty command line")))?;

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    execute(command, argv.join(" "), timeout).await
}

/// Run a command line through `bash -c`, capturing stdout and stderr
///
/// Use this when the invocation relies on shell interpretation; prefer
/// [`run`] everywhere else.
pub async fn run_shell(
    command_line: &str,
    cwd: Option<&Utf8Path>,
    timeout: Option<Duration>,
) -> Result<ProcessResult> {
    let mut command = Command::new("bash");
    command.arg("-c").arg(command_line);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    execute(command, command_line.to_string(), timeout).await
}

async fn execute(
    mut command: Command,
    command_line: String,
    timeout: Option<Duration>,
) -> Result<ProcessResult> {
    debug!("Running: {command_line}");

    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    // Dropping the in-flight wait future must not leave the child behind
    command.kill_on_drop(true);

    let child = match command.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ProcessResult::not_found(err.to_string()));
        }
        Err(err) => return Err(Error::spawn(command_line, err)),
    };

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(output) => output,
            Err(_) => return Ok(ProcessResult::timed_out(limit)),
        },
        None => child.wait_with_output().await,
    };
    let output = output.map_err(|err| Error::spawn(command_line, err))?;

    Ok(ProcessResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[tokio::test]
    async fn captures_stdout_of_successful_command() {
        let result = run(&["echo", "hello"], None, None).await.unwrap();

        assert!(result.success());
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout_trimmed(), "hello");
    }

    #[tokio::test]
    async fn reports_nonzero_exit_as_result() {
        let result = run(&["bash", "-c", "exit 3"], None, None).await.unwrap();

        assert!(!result.success());
        assert_eq!(result.exit_code, 3);
    }

    #[tokio::test]
    async fn captures_stderr() {
        let result = run(&["bash", "-c", "echo oops >&2; exit 1"], None, None)
            .await
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("oops"));
    }

    #[tokio::test]
    async fn missing_program_reports_exit_127() {
        let result = run(&["definitely-not-a-real-binary-4f9c"], None, None)
            .await
            .unwrap();

        assert_eq!(result.exit_code, EXIT_NOT_FOUND);
        assert!(!result.stderr.is_empty());
    }

    #[tokio::test]
    async fn missing_working_directory_reports_exit_127() {
        let cwd = Utf8PathBuf::from("/no/such/directory-4f9c");
        let result = run(&["echo", "hi"], Some(&cwd), None).await.unwrap();

        assert_eq!(result.exit_code, EXIT_NOT_FOUND);
    }

    #[tokio::test]
    async fn timeout_kills_process_and_reports_exit_124() {
        let result = run(
            &["sleep", "10"],
            None,
            Some(Duration::from_millis(200)),
        )
        .await
        .unwrap();

        assert_eq!(result.exit_code, EXIT_TIMED_OUT);
        assert!(result.stderr.contains("timed out"));
    }

    #[tokio::test]
    async fn runs_in_requested_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let cwd = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let result = run(&["ls"], Some(&cwd), None).await.unwrap();

        assert!(result.success());
        assert!(result.stdout.contains("marker.txt"));
    }

    #[tokio::test]
    async fn shell_invocation_supports_interpretation() {
        let result = run_shell("echo $((20 + 3))", None, None).await.unwrap();

        assert!(result.success());
        assert_eq!(result.stdout_trimmed(), "23");
    }

    #[tokio::test]
    async fn empty_command_line_is_an_error() {
        let result = run(&[], None, None).await;

        assert!(result.is_err());
    }
}
