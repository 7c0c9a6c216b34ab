//! Infrastructure traits for abstracting I/O operations.
//!
//! The pipeline never touches `std::fs` or `std::process` directly. Everything goes
//! through [`FileSystem`] and [`CommandExecutor`] so the orchestration logic can be
//! exercised with in-memory mocks.

use std::fs::Metadata;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// How often a child running under a deadline is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long captured streams are awaited after a timed-out child is killed.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Trait for abstracting filesystem operations.
///
/// Implementations must be shareable across the worker pool, hence the
/// `Send + Sync` bound.
pub trait FileSystem: Send + Sync {
    /// Create a directory and all missing parent directories.
    ///
    /// An already existing directory is not an error.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Get metadata for a file or directory.
    fn metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Read the entire contents of a file into a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write a slice of bytes to a file, replacing any previous contents.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Size in bytes of a regular file.
    ///
    /// Fails if the path is missing or is not a regular file.
    fn file_size(&self, path: &Path) -> io::Result<u64> {
        let meta = self.metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(meta.len())
    }
}

/// Real filesystem implementation that delegates to std::fs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        std::fs::metadata(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// Captured output of a command that may have been stopped by a deadline.
#[derive(Debug, Clone)]
pub struct TimedOutput {
    /// Exit status and captured streams
    pub output: Output,
    /// Whether the process was killed because it exceeded its deadline
    pub timed_out: bool,
}

/// Trait for abstracting command execution.
///
/// Implementations must be shareable across the worker pool, hence the
/// `Send + Sync` bound.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command and return its exit status, inheriting stdio.
    fn status(&self, cmd: &mut Command) -> io::Result<ExitStatus>;

    /// Execute a command and return its output (stdout, stderr, status).
    fn output(&self, cmd: &mut Command) -> io::Result<Output>;

    /// Execute a command, capturing output, and kill it once `timeout` elapses.
    ///
    /// With no timeout this is [`CommandExecutor::output`].
    fn output_with_timeout(
        &self,
        cmd: &mut Command,
        timeout: Option<Duration>,
    ) -> io::Result<TimedOutput> {
        match timeout {
            None => self.output(cmd).map(|output| TimedOutput {
                output,
                timed_out: false,
            }),
            Some(timeout) => run_with_deadline(cmd, timeout),
        }
    }

    /// Execute a command built with a closure and return its output.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bundle_sizer::infra::{CommandExecutor, RealCommandExecutor};
    ///
    /// let executor = RealCommandExecutor;
    /// let output = executor.execute(|cmd| cmd.arg("--version"), "node")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    fn execute<F>(&self, builder: F, program: &str) -> io::Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let mut cmd = Command::new(program);
        builder(&mut cmd);
        self.output(&mut cmd)
    }

    /// Execute a command built with a closure and return its exit status.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bundle_sizer::infra::{CommandExecutor, RealCommandExecutor};
    ///
    /// let executor = RealCommandExecutor;
    /// let status = executor.run(|cmd| cmd.arg("install"), "npm")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    fn run<F>(&self, builder: F, program: &str) -> io::Result<ExitStatus>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let mut cmd = Command::new(program);
        builder(&mut cmd);
        self.status(&mut cmd)
    }
}

/// Real command executor that delegates to std::process::Command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn status(&self, cmd: &mut Command) -> io::Result<ExitStatus> {
        cmd.status()
    }

    fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        cmd.output()
    }
}

/// Spawn `cmd` with piped streams and poll it until it exits or `timeout` passes.
///
/// On unix the child leads its own process group, and the whole group is
/// killed at the deadline so helpers it started do not outlive it.
fn run_with_deadline(cmd: &mut Command, timeout: Duration) -> io::Result<TimedOutput> {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Pipes are drained on their own threads so a chatty child cannot block on a full pipe.
    let stdout = PipeReader::spawn(child.stdout.take());
    let stderr = PipeReader::spawn(child.stderr.take());

    let started = Instant::now();
    let mut timed_out = false;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if started.elapsed() >= timeout {
            timed_out = true;
            kill_process_tree(&mut child);
            break child.wait()?;
        }
        thread::sleep(POLL_INTERVAL);
    };

    // A killed build may leave a descendant holding the pipes open; keep
    // whatever was read and stop waiting after a short grace period.
    let grace = timed_out.then(|| Instant::now() + DRAIN_GRACE);
    Ok(TimedOutput {
        output: Output {
            status,
            stdout: stdout.collect(grace),
            stderr: stderr.collect(grace),
        },
        timed_out,
    })
}

#[cfg(unix)]
fn kill_process_tree(child: &mut Child) {
    let group = format!("-{}", child.id());
    let killed = Command::new("kill")
        .args(["-KILL", "--", &group])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());
    if !killed {
        log::debug!("group kill of {} failed, killing the child only", child.id());
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) {
    let _ = child.kill();
}

/// Background reader that accumulates one child stream.
struct PipeReader {
    buf: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

impl PipeReader {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        let sink = Arc::clone(&buf);
        thread::spawn(move || {
            if let Some(mut pipe) = pipe {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => sink.lock().extend_from_slice(&chunk[..n]),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(_) => break,
                    }
                }
            }
            let _ = tx.send(());
        });
        Self { buf, done }
    }

    /// Wait for end of stream, or until `deadline` when one is given.
    fn collect(self, deadline: Option<Instant>) -> Vec<u8> {
        match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let _ = self.done.recv_timeout(remaining);
            }
            None => {
                let _ = self.done.recv();
            }
        }
        std::mem::take(&mut *self.buf.lock())
    }
}

/// Create an ExitStatus with the given exit code for use in test mocks.
///
/// This avoids spawning actual processes (like `Command::new("true")`) in tests.
#[cfg(all(test, unix))]
pub fn mock_exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8) // Unix stores exit code in upper bits
}

#[cfg(all(test, windows))]
pub fn mock_exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}
