//! # Design
//!
//! - One error type for the pipeline: command failures, gate violations, and
//!   outcome persistence.
//! - Command failures carry the captured stderr so callers can report context
//!   without re-running the tool.
//! - Preserve source errors; context lives in fields.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::Step;
use crate::threshold::ThresholdViolation;

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors produced while supervising a SnapRAID run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The tool could not be started.
    #[error("failed to start snapraid {step}")]
    Spawn {
        /// Step being launched.
        step: Step,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Reading the tool's output or waiting for it failed.
    #[error("failed to capture snapraid {step} output")]
    Capture {
        /// Step whose output was being read.
        step: Step,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The tool exited with an outcome that is not acceptable for the step.
    #[error("snapraid {step} failed ({}){}", exit_label(.exit_code), stderr_suffix(.stderr))]
    Execution {
        /// Step that failed.
        step: Step,
        /// Exit code, or `None` when the process was terminated by a signal.
        exit_code: Option<i32>,
        /// Captured error-stream content.
        stderr: String,
    },
    /// Detected changes exceeded a configured limit.
    #[error(transparent)]
    Threshold(#[from] ThresholdViolation),
    /// Filesystem failures while persisting an outcome.
    #[error("outcome io failure during {operation}")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Serialising an outcome failed.
    #[error("outcome json failure during {operation}")]
    Json {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Destination path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Step associated with the failure, when it came from a command.
    #[must_use]
    pub const fn step(&self) -> Option<Step> {
        match self {
            Self::Spawn { step, .. } | Self::Capture { step, .. } | Self::Execution { step, .. } => {
                Some(*step)
            }
            Self::Threshold(_) | Self::Io { .. } | Self::Json { .. } => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(
        || "terminated by signal".to_string(),
        |code| format!("exit status {code}"),
    )
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\nstderr:\n{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeKind;
    use std::error::Error;

    #[test]
    fn execution_error_includes_status_and_stderr() {
        let err = PipelineError::Execution {
            step: Step::Sync,
            exit_code: Some(1),
            stderr: "  disk full\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "snapraid sync failed (exit status 1)\nstderr:\ndisk full"
        );
        assert_eq!(err.step(), Some(Step::Sync));

        let signalled = PipelineError::Execution {
            step: Step::Diff,
            exit_code: None,
            stderr: String::new(),
        };
        assert_eq!(
            signalled.to_string(),
            "snapraid diff failed (terminated by signal)"
        );
    }

    #[test]
    fn threshold_violation_is_transparent() {
        let err = PipelineError::from(ThresholdViolation {
            category: ChangeKind::Removed,
            actual: 90,
            limit: 80,
        });
        assert_eq!(err.to_string(), "removed files exceed threshold (90 > 80)");
        assert!(err.step().is_none());
    }

    #[test]
    fn helpers_build_variants_with_sources() {
        let io_err = PipelineError::io("write", "out.json", io::Error::other("io"));
        assert!(matches!(io_err, PipelineError::Io { .. }));
        assert!(io_err.source().is_some());

        let json_source = serde_json::from_str::<serde_json::Value>("{")
            .err()
            .expect("invalid json");
        let json_err = PipelineError::json("encode", "out.json", json_source);
        assert!(matches!(json_err, PipelineError::Json { .. }));
        assert!(json_err.source().is_some());
    }
}
