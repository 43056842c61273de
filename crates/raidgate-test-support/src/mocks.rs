//! In-memory [`CommandExecutor`] with scripted results and invocation counters.

use std::sync::{Mutex, MutexGuard};

use raidgate_pipeline::{CommandExecutor, PipelineError, PipelineResult, Step};

/// Scripted executor that records every call instead of spawning processes.
///
/// By default every operation succeeds and diff reports no output.
#[derive(Debug, Default)]
pub struct FakeExecutor {
    diff_lines: Vec<String>,
    failures: Vec<(Step, Option<i32>, String)>,
    calls: Mutex<Vec<Step>>,
}

impl FakeExecutor {
    /// Executor where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines returned from `diff`.
    #[must_use]
    pub fn with_diff_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.diff_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Make `step` fail with exit status 1 and `stderr` as captured diagnostics.
    #[must_use]
    pub fn failing_on(self, step: Step, stderr: impl Into<String>) -> Self {
        self.failing_with(step, Some(1), stderr)
    }

    /// Make `step` fail with an explicit exit code (`None` for a signal).
    #[must_use]
    pub fn failing_with(
        mut self,
        step: Step,
        exit_code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        self.failures.retain(|(existing, _, _)| *existing != step);
        self.failures.push((step, exit_code, stderr.into()));
        self
    }

    /// Number of times `step` was invoked.
    #[must_use]
    pub fn calls(&self, step: Step) -> usize {
        self.lock_calls()
            .iter()
            .filter(|called| **called == step)
            .count()
    }

    /// Every invocation in call order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Step> {
        self.lock_calls().clone()
    }

    fn invoke(&self, step: Step) -> PipelineResult<()> {
        self.lock_calls().push(step);
        match self.failures.iter().find(|(failing, _, _)| *failing == step) {
            Some((_, exit_code, stderr)) => Err(PipelineError::Execution {
                step,
                exit_code: *exit_code,
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<Step>> {
        match self.calls.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl CommandExecutor for FakeExecutor {
    fn touch(&self) -> PipelineResult<()> {
        self.invoke(Step::Touch)
    }

    fn diff(&self) -> PipelineResult<Vec<String>> {
        self.invoke(Step::Diff)?;
        Ok(self.diff_lines.clone())
    }

    fn sync(&self) -> PipelineResult<()> {
        self.invoke(Step::Sync)
    }

    fn scrub(&self) -> PipelineResult<()> {
        self.invoke(Step::Scrub)
    }

    fn smart(&self) -> PipelineResult<()> {
        self.invoke(Step::Smart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_calls_per_step() -> anyhow::Result<()> {
        let fake = FakeExecutor::new().with_diff_lines(["add a"]);
        fake.touch()?;
        assert_eq!(fake.diff()?, vec!["add a".to_string()]);
        fake.diff()?;
        assert_eq!(fake.calls(Step::Diff), 2);
        assert_eq!(fake.calls(Step::Sync), 0);
        assert_eq!(fake.invocations(), vec![Step::Touch, Step::Diff, Step::Diff]);
        Ok(())
    }

    #[test]
    fn scripted_failure_carries_stderr() {
        let fake = FakeExecutor::new().failing_with(Step::Smart, None, "smartctl missing");
        let err = fake.smart().expect_err("smart should fail");
        assert!(matches!(
            err,
            PipelineError::Execution {
                step: Step::Smart,
                exit_code: None,
                ref stderr,
            } if stderr == "smartctl missing"
        ));
        assert_eq!(fake.calls(Step::Smart), 1);
    }
}
