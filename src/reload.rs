//! Resolver reload via an external command.

use crate::config::OverrideConfig;
use crate::error::ReloadError;
use crate::util::{find_executable, kill_process_group};
use std::io::Read;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::time::Duration;

/// How long to wait for pipe EOF once `sh` has exited.
const OUTPUT_GRACE: Duration = Duration::from_millis(250);

/// Captured output of a successful reload. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadOutput {
    /// Trimmed standard output.
    pub stdout: String,
    /// Trimmed standard error.
    pub stderr: String,
}

/// Runs the configured reload command through `sh -c`.
///
/// The command runs in its own process group; when the timeout expires the
/// whole group is killed and [`ReloadError::TimedOut`] is returned.
#[derive(Debug, Clone)]
pub struct ResolverReloader {
    command: String,
    timeout: Duration,
}

impl ResolverReloader {
    /// Creates a reloader for `command` bounded by `timeout`.
    #[must_use]
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// Creates a reloader from the configured command and timeout.
    #[must_use]
    pub fn from_config(config: &OverrideConfig) -> Self {
        Self::new(&config.reload_command, config.reload_timeout)
    }

    /// Returns the configured command string.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Runs the reload command to completion.
    ///
    /// Completion means `sh` has exited. Background processes it leaves
    /// behind keep running even if they hold its stdout or stderr open;
    /// output they write after the exit is not captured.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError`] if the shell cannot be spawned, the command
    /// exits non-zero or by signal, or it outlives the timeout.
    pub fn reload(&self) -> Result<ReloadOutput, ReloadError> {
        tracing::debug!(command = %self.command, timeout = ?self.timeout, "Reloading resolver");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .spawn()
            .map_err(|source| ReloadError::Spawn {
                command: self.command.clone(),
                source,
            })?;
        let pid = child.id();
        let stdout = PipeDrain::spawn(child.stdout.take());
        let stderr = PipeDrain::spawn(child.stderr.take());

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(child.wait());
        });

        let status = match rx.recv_timeout(self.timeout) {
            Ok(result) => result.map_err(|source| ReloadError::Wait {
                command: self.command.clone(),
                source,
            })?,
            Err(_) => {
                kill_process_group(pid);
                tracing::warn!(
                    command = %self.command,
                    timeout = ?self.timeout,
                    "Resolver reload timed out, killed"
                );
                return Err(ReloadError::TimedOut {
                    command: self.command.clone(),
                    timeout: self.timeout,
                });
            }
        };

        let stdout = stdout.collect();
        let stderr = stderr.collect();

        if !status.success() {
            tracing::warn!(
                command = %self.command,
                status = %status,
                stderr = %stderr,
                "Resolver reload failed"
            );
            return Err(ReloadError::Failed {
                command: self.command.clone(),
                status: status.to_string(),
                output: if stderr.is_empty() { stdout } else { stderr },
            });
        }

        tracing::info!(command = %self.command, "Resolver reloaded");
        Ok(ReloadOutput { stdout, stderr })
    }

    /// Returns `true` if the command's program can be found.
    ///
    /// Looks up the first word of the command on `PATH`. Never fails.
    #[must_use]
    pub fn is_tool_available(&self) -> bool {
        self.command
            .split_whitespace()
            .next()
            .and_then(find_executable)
            .is_some()
    }
}

/// Reads a child pipe on its own thread so the exit status can be awaited
/// independently of pipe EOF.
struct PipeDrain {
    buf: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

impl PipeDrain {
    fn spawn(pipe: Option<impl Read + Send + 'static>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        if let Some(mut pipe) = pipe {
            let sink = Arc::clone(&buf);
            std::thread::spawn(move || {
                let mut chunk = [0u8; 4096];
                while let Ok(n @ 1..) = pipe.read(&mut chunk) {
                    sink.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]);
                }
                let _ = tx.send(());
            });
        }
        Self { buf, done }
    }

    /// Waits briefly for EOF, then returns what was read, trimmed.
    fn collect(self) -> String {
        let _ = self.done.recv_timeout(OUTPUT_GRACE);
        let bytes = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_secs(10);

    #[test]
    fn successful_reload_captures_output() {
        let out = ResolverReloader::new("echo reloaded; echo note >&2", SHORT)
            .reload()
            .unwrap();
        assert_eq!(out.stdout, "reloaded");
        assert_eq!(out.stderr, "note");
    }

    #[test]
    fn non_zero_exit_is_failure() {
        let err = ResolverReloader::new("echo boom >&2; exit 3", SHORT)
            .reload()
            .unwrap_err();
        match err {
            ReloadError::Failed { status, output, .. } => {
                assert!(status.contains('3'), "{status}");
                assert_eq!(output, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failure_falls_back_to_stdout() {
        let err = ResolverReloader::new("echo only-stdout; false", SHORT)
            .reload()
            .unwrap_err();
        assert!(matches!(err, ReloadError::Failed { ref output, .. } if output == "only-stdout"));
    }

    #[test]
    fn missing_program_is_failure() {
        let err = ResolverReloader::new("definitely-not-a-real-binary-42", SHORT)
            .reload()
            .unwrap_err();
        assert!(matches!(err, ReloadError::Failed { .. }));
    }

    #[test]
    fn slow_command_times_out() {
        let started = std::time::Instant::now();
        let err = ResolverReloader::new("sleep 30", Duration::from_millis(200))
            .reload()
            .unwrap_err();
        assert!(matches!(err, ReloadError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn background_child_holding_stdout_does_not_block() {
        let started = std::time::Instant::now();
        let out = ResolverReloader::new("sleep 5 & echo started", Duration::from_secs(3))
            .reload()
            .unwrap();
        assert_eq!(out.stdout, "started");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn tool_availability_checks_first_word() {
        assert!(ResolverReloader::new("sh -c true", SHORT).is_tool_available());
        assert!(!ResolverReloader::new("definitely-not-a-real-binary-42 restartdns", SHORT)
            .is_tool_available());
        assert!(!ResolverReloader::new("   ", SHORT).is_tool_available());
    }
}
