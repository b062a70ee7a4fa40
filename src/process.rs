//! External tool invocation shared by text extraction and speech synthesis.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error("no command configured")]
    Empty,
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} did not finish within {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
    #[error("{program} exited with status {status}: {stderr}")]
    Exited {
        program: String,
        status: i32,
        stderr: String,
    },
}

/// Captured output of a successful run.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Run `argv` followed by `extra` and wait at most `timeout`.
///
/// The child is killed when the deadline passes or the future is dropped.
pub async fn run<I, S>(
    argv: &[String],
    extra: I,
    timeout: Duration,
) -> Result<CommandOutput, CommandFailure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let Some((program, base_args)) = argv.split_first() else {
        return Err(CommandFailure::Empty);
    };

    let mut command = Command::new(program);
    command
        .args(base_args)
        .args(extra)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(program = %program, ?timeout, "Spawning external command");
    let child = command.spawn().map_err(|source| CommandFailure::Spawn {
        program: program.clone(),
        source,
    })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(CommandFailure::Spawn {
                program: program.clone(),
                source,
            });
        }
        Err(_) => {
            warn!(program = %program, ?timeout, "External command timed out; killed");
            return Err(CommandFailure::Timeout {
                program: program.clone(),
                timeout,
            });
        }
    };

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !output.status.success() {
        return Err(CommandFailure::Exited {
            program: program.clone(),
            status: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    Ok(CommandOutput {
        stdout: output.stdout,
        stderr,
    })
}

/// A fresh path in `dir` derived from `stem`, never shared between concurrent callers.
pub fn unique_temp_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let nonce = SEQ.fetch_add(1, Ordering::Relaxed);
    let ts_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dir.join(format!("{stem}.tmp-{ts_nanos}-{nonce}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn temp_paths_are_unique() {
        let dir = Path::new("/tmp");
        let a = unique_temp_path(dir, "book", "txt");
        let b = unique_temp_path(dir, "book", "txt");
        assert_ne!(a, b);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("txt"));
        assert!(a.starts_with(dir));
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let err = run(&[], Vec::<String>::new(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandFailure::Empty));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_and_appends_arguments() {
        let out = run(&argv(&["sh", "-c", "echo \"$0 $1\""]), ["one", "two"], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "one two");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_reports_stderr() {
        let err = run(
            &argv(&["sh", "-c", "echo broken >&2; exit 3"]),
            Vec::<String>::new(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        match err {
            CommandFailure::Exited { status, stderr, .. } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected failure: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let err = run(&argv(&["sleep", "5"]), Vec::<String>::new(), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandFailure::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let err = run(
            &argv(&["definitely-not-an-installed-program"]),
            Vec::<String>::new(),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CommandFailure::Spawn { .. }));
    }
}
