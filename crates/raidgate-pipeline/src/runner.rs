//! Ordered step state machine supervising one SnapRAID maintenance run.
//!
//! # Design
//! - Steps run strictly in sequence: touch, diff, gate, sync, scrub, smart.
//! - The first failing step ends the run; its error becomes the outcome's terminal error.
//! - Each step's duration is stored before its result is inspected, so a failing step
//!   keeps its time-to-failure. The total is recorded on every exit path.
//! - Dry run stops after diff; nothing that mutates the array is invoked.

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::diff::parse_diff;
use crate::error::PipelineResult;
use crate::executor::CommandExecutor;
use crate::model::{ChangeKind, PipelineConfig, Step, ThresholdSet};
use crate::outcome::{RunOutcome, StepTiming};
use crate::threshold::check_thresholds;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepStatus {
    Started,
    Completed,
    Failed,
    Skipped,
}

impl StepStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Orchestrates a [`CommandExecutor`] through one full pipeline invocation.
pub struct PipelineRunner<E> {
    executor: E,
    config: PipelineConfig,
    thresholds: ThresholdSet,
}

impl<E: CommandExecutor> PipelineRunner<E> {
    /// Build a runner over `executor` with fixed configuration for every run.
    #[must_use]
    pub const fn new(executor: E, config: PipelineConfig, thresholds: ThresholdSet) -> Self {
        Self {
            executor,
            config,
            thresholds,
        }
    }

    /// Executor driven by this runner.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Execute the pipeline once, blocking until the last step returns.
    ///
    /// Never fails directly; failures are reported through [`RunOutcome::error`].
    #[must_use]
    pub fn run(&self) -> RunOutcome {
        let started = Instant::now();
        let mut outcome = RunOutcome::new(Utc::now());
        info!(
            dry_run = self.config.dry_run,
            touch = self.config.steps.touch,
            scrub = self.config.steps.scrub,
            smart = self.config.steps.smart,
            "pipeline starting"
        );

        if let Err(err) = self.execute(&mut outcome) {
            outcome.error = Some(err);
        }
        outcome.timings.total = started.elapsed();

        match &outcome.error {
            None => info!(
                elapsed_ms = millis(outcome.timings.total),
                "pipeline finished"
            ),
            Some(err) => error!(
                error = %err,
                elapsed_ms = millis(outcome.timings.total),
                "pipeline aborted"
            ),
        }
        outcome
    }

    fn execute(&self, outcome: &mut RunOutcome) -> PipelineResult<()> {
        if !self.config.steps.touch {
            log_skipped(Step::Touch, "disabled");
        } else if self.config.dry_run {
            log_skipped(Step::Touch, "dry run");
        } else {
            self.step(&mut outcome.timings, Step::Touch, |exec| exec.touch())?;
        }

        let lines = self.step(&mut outcome.timings, Step::Diff, |exec| exec.diff())?;
        outcome.result = parse_diff(lines);
        log_changes(outcome);

        if self.config.dry_run {
            for step in [Step::Sync, Step::Scrub, Step::Smart] {
                log_skipped(step, "dry run");
            }
            return Ok(());
        }

        if outcome.has_changes() {
            if let Some(violation) = check_thresholds(&outcome.result, &self.thresholds) {
                warn!(
                    category = violation.category.as_str(),
                    actual = violation.actual,
                    limit = violation.limit,
                    "change threshold exceeded; refusing to sync"
                );
                return Err(violation.into());
            }
            self.step(&mut outcome.timings, Step::Sync, |exec| exec.sync())?;
        } else {
            log_skipped(Step::Sync, "no changes");
        }

        if self.config.steps.scrub {
            self.step(&mut outcome.timings, Step::Scrub, |exec| exec.scrub())?;
        } else {
            log_skipped(Step::Scrub, "disabled");
        }

        if self.config.steps.smart {
            self.step(&mut outcome.timings, Step::Smart, |exec| exec.smart())?;
        } else {
            log_skipped(Step::Smart, "disabled");
        }
        Ok(())
    }

    fn step<T, F>(&self, timings: &mut StepTiming, step: Step, op: F) -> PipelineResult<T>
    where
        F: FnOnce(&E) -> PipelineResult<T>,
    {
        info!(
            step = step.as_str(),
            status = StepStatus::Started.as_str(),
            "pipeline step"
        );
        let started = Instant::now();
        let result = op(&self.executor);
        let elapsed = started.elapsed();
        timings.record(step, elapsed);

        match &result {
            Ok(_) => info!(
                step = step.as_str(),
                status = StepStatus::Completed.as_str(),
                elapsed_ms = millis(elapsed),
                "pipeline step"
            ),
            Err(err) => error!(
                step = step.as_str(),
                status = StepStatus::Failed.as_str(),
                elapsed_ms = millis(elapsed),
                error = %err,
                "pipeline step"
            ),
        }
        result
    }
}

fn log_skipped(step: Step, reason: &'static str) {
    info!(
        step = step.as_str(),
        status = StepStatus::Skipped.as_str(),
        reason,
        "pipeline step"
    );
}

fn log_changes(outcome: &RunOutcome) {
    let changes = &outcome.result;
    info!(
        equal = changes.equal,
        added = changes.count(ChangeKind::Added),
        removed = changes.count(ChangeKind::Removed),
        updated = changes.count(ChangeKind::Updated),
        moved = changes.count(ChangeKind::Moved),
        copied = changes.count(ChangeKind::Copied),
        restored = changes.count(ChangeKind::Restored),
        "diff parsed"
    );
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
