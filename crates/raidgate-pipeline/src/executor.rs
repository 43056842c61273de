//! Capability interface over the five SnapRAID subcommands, plus the
//! process-spawning adapter used in production.
//!
//! # Design
//! - Exit-code acceptance is decided per step: `diff` accepts "no differences" (0)
//!   and "differences found" (2); every other step accepts only 0.
//! - stdout and stderr are drained on separate threads, each through its own
//!   [`LineTap`], so neither pipe can fill up and stall the tool.
//! - Both taps are flushed before the call returns; output from one step never
//!   interleaves with the next.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use tracing::{Level, debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::model::{ScrubOptions, Step};
use crate::tap::{LineSink, LineTap, TracingSink};

const READ_CHUNK: usize = 8 * 1024;
const QUIET_FLAG: &str = "--quiet";

/// Operations the pipeline needs from the underlying tool.
///
/// Every call blocks until the command completes.
pub trait CommandExecutor {
    /// Refresh file metadata timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot run or exits unsuccessfully.
    fn touch(&self) -> PipelineResult<()>;

    /// Compare the array against its parity state and return the raw stdout lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot run or exits with anything other
    /// than "no differences" or "differences found".
    fn diff(&self) -> PipelineResult<Vec<String>>;

    /// Commit detected changes into parity.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot run or exits unsuccessfully.
    fn sync(&self) -> PipelineResult<()>;

    /// Verify a portion of the array.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot run or exits unsuccessfully.
    fn scrub(&self) -> PipelineResult<()>;

    /// Report disk health.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot run or exits unsuccessfully.
    fn smart(&self) -> PipelineResult<()>;
}

/// Returns `true` when `code` is a successful exit for `step`.
#[must_use]
pub const fn accepts_exit_code(step: Step, code: i32) -> bool {
    match step {
        Step::Diff => matches!(code, 0 | 2),
        Step::Touch | Step::Sync | Step::Scrub | Step::Smart => code == 0,
    }
}

/// [`CommandExecutor`] that shells out to the `snapraid` binary.
#[derive(Clone)]
pub struct SnapraidExecutor {
    binary: PathBuf,
    config: PathBuf,
    scrub: ScrubOptions,
    sink: Arc<dyn LineSink>,
}

impl SnapraidExecutor {
    /// Build an executor that logs command output through `tracing`.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, config: impl Into<PathBuf>, scrub: ScrubOptions) -> Self {
        Self {
            binary: binary.into(),
            config: config.into(),
            scrub,
            sink: Arc::new(TracingSink),
        }
    }

    /// Route captured output lines to `sink` instead of `tracing`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Full argument list passed to the binary for `step`.
    #[must_use]
    pub fn arguments(&self, step: Step) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            step.as_str().into(),
            "--conf".into(),
            self.config.clone().into_os_string(),
        ];
        match step {
            Step::Touch | Step::Diff | Step::Sync => args.push(QUIET_FLAG.into()),
            Step::Scrub => {
                args.push("--plan".into());
                args.push(self.scrub.plan.to_string().into());
                args.push("--older-than".into());
                args.push(self.scrub.older_than.to_string().into());
            }
            Step::Smart => {}
        }
        args
    }

    fn run(&self, step: Step) -> PipelineResult<Vec<u8>> {
        let args = self.arguments(step);
        info!(
            step = step.as_str(),
            binary = %self.binary.display(),
            "running snapraid command"
        );
        debug!(step = step.as_str(), args = ?args, "snapraid arguments");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PipelineError::Spawn { step, source })?;

        let stdout_tap = LineTap::new(step.as_str(), Level::INFO, Arc::clone(&self.sink));
        let stderr_tap = LineTap::new(step.as_str(), Level::ERROR, Arc::clone(&self.sink));
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let (stdout, stderr) = thread::scope(|scope| {
            let stdout_reader = scope.spawn(|| drain_optional(stdout_pipe, &stdout_tap));
            let stderr_reader = scope.spawn(|| drain_optional(stderr_pipe, &stderr_tap));
            (join_reader(stdout_reader), join_reader(stderr_reader))
        });

        let status = child
            .wait()
            .map_err(|source| PipelineError::Capture { step, source })?;
        stdout_tap.flush();
        stderr_tap.flush();

        let stdout = stdout.map_err(|source| PipelineError::Capture { step, source })?;
        let stderr = stderr.map_err(|source| PipelineError::Capture { step, source })?;

        match status.code() {
            Some(code) if accepts_exit_code(step, code) => {
                debug!(step = step.as_str(), exit_code = code, "snapraid command finished");
                Ok(stdout)
            }
            exit_code => Err(PipelineError::Execution {
                step,
                exit_code,
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            }),
        }
    }
}

impl CommandExecutor for SnapraidExecutor {
    fn touch(&self) -> PipelineResult<()> {
        self.run(Step::Touch).map(drop)
    }

    fn diff(&self) -> PipelineResult<Vec<String>> {
        let stdout = self.run(Step::Diff)?;
        Ok(String::from_utf8_lossy(&stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    fn sync(&self) -> PipelineResult<()> {
        self.run(Step::Sync).map(drop)
    }

    fn scrub(&self) -> PipelineResult<()> {
        self.run(Step::Scrub).map(drop)
    }

    fn smart(&self) -> PipelineResult<()> {
        self.run(Step::Smart).map(drop)
    }
}

fn drain_optional<R: Read>(pipe: Option<R>, tap: &LineTap) -> io::Result<Vec<u8>> {
    let Some(pipe) = pipe else {
        return Err(io::Error::other("child pipe unavailable"));
    };
    drain(pipe, tap)
}

fn drain<R: Read>(mut reader: R, tap: &LineTap) -> io::Result<Vec<u8>> {
    let mut captured = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(captured),
            Ok(read) => {
                tap.write(&chunk[..read]);
                captured.extend_from_slice(&chunk[..read]);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
}

fn join_reader(
    handle: thread::ScopedJoinHandle<'_, io::Result<Vec<u8>>>,
) -> io::Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("output reader thread panicked")))
}
