//! Terminal record of one pipeline invocation and its on-disk JSON form.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::error::{PipelineError, PipelineResult};
use crate::model::{ChangeSet, Step};

/// Wall-clock duration of each step plus the whole run.
///
/// Steps that never ran stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepTiming {
    /// `snapraid touch`.
    #[serde(serialize_with = "as_nanos")]
    pub touch: Duration,
    /// `snapraid diff`.
    #[serde(serialize_with = "as_nanos")]
    pub diff: Duration,
    /// `snapraid sync`.
    #[serde(serialize_with = "as_nanos")]
    pub sync: Duration,
    /// `snapraid scrub`.
    #[serde(serialize_with = "as_nanos")]
    pub scrub: Duration,
    /// `snapraid smart`.
    #[serde(serialize_with = "as_nanos")]
    pub smart: Duration,
    /// Entire invocation, set on every exit path.
    #[serde(serialize_with = "as_nanos")]
    pub total: Duration,
}

impl StepTiming {
    /// Duration recorded for `step`.
    #[must_use]
    pub const fn get(&self, step: Step) -> Duration {
        match step {
            Step::Touch => self.touch,
            Step::Diff => self.diff,
            Step::Sync => self.sync,
            Step::Scrub => self.scrub,
            Step::Smart => self.smart,
        }
    }

    pub(crate) const fn record(&mut self, step: Step, elapsed: Duration) {
        match step {
            Step::Touch => self.touch = elapsed,
            Step::Diff => self.diff = elapsed,
            Step::Sync => self.sync = elapsed,
            Step::Scrub => self.scrub = elapsed,
            Step::Smart => self.smart = elapsed,
        }
    }
}

/// Everything a pipeline invocation produced.
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    /// Instant the run started.
    #[serde(serialize_with = "as_rfc3339")]
    pub timestamp: DateTime<Utc>,
    /// Parsed diff result; empty when diff never completed.
    pub result: ChangeSet,
    /// Per-step durations.
    pub timings: StepTiming,
    /// Terminal error, if the run stopped early.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "error_text"
    )]
    pub error: Option<PipelineError>,
}

impl RunOutcome {
    /// Start an empty outcome captured at `timestamp`.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            result: ChangeSet::default(),
            timings: StepTiming::default(),
            error: None,
        }
    }

    /// Returns `true` when the run finished without a terminal error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Returns `true` when diff detected at least one changed path.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.result.has_changes()
    }

    /// RFC 3339 rendering of the capture instant, second precision, `Z` suffix.
    #[must_use]
    pub fn timestamp_label(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Write the outcome as pretty JSON to `<dir>/<timestamp>.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the outcome cannot be
    /// serialised, or the file cannot be written.
    pub fn write_json(&self, dir: &Path) -> PipelineResult<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|source| PipelineError::io("create_output_dir", dir, source))?;
        let path = dir.join(format!("{}.json", self.timestamp_label()));
        let body = serde_json::to_vec_pretty(self)
            .map_err(|source| PipelineError::json("serialize_outcome", &path, source))?;
        fs::write(&path, body).map_err(|source| PipelineError::io("write_outcome", &path, source))?;
        Ok(path)
    }
}

fn as_nanos<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_nanos()).unwrap_or(u64::MAX))
}

fn as_rfc3339<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[allow(clippy::ref_option)]
fn error_text<S: Serializer>(
    value: &Option<PipelineError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(error) => serializer.serialize_str(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeKind;
    use crate::threshold::ThresholdViolation;
    use chrono::TimeZone;

    type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

    fn fixed_outcome() -> TestResult<RunOutcome> {
        let timestamp = Utc
            .with_ymd_and_hms(2026, 3, 14, 2, 30, 5)
            .single()
            .ok_or("invalid timestamp")?;
        Ok(RunOutcome::new(timestamp))
    }

    #[test]
    fn timestamp_label_uses_seconds_and_zulu() -> TestResult<()> {
        assert_eq!(fixed_outcome()?.timestamp_label(), "2026-03-14T02:30:05Z");
        Ok(())
    }

    #[test]
    fn record_sets_only_the_named_step() {
        let mut timings = StepTiming::default();
        timings.record(Step::Scrub, Duration::from_millis(1500));
        assert_eq!(timings.get(Step::Scrub), Duration::from_millis(1500));
        assert_eq!(timings.get(Step::Sync), Duration::ZERO);
        assert_eq!(timings.total, Duration::ZERO);
    }

    #[test]
    fn serialises_nanoseconds_and_omits_empty_fields() -> TestResult<()> {
        let mut outcome = fixed_outcome()?;
        outcome.result.equal = 4;
        outcome.result.added.push("a.txt".into());
        outcome.timings.diff = Duration::from_secs(2);
        outcome.timings.total = Duration::from_nanos(2_000_000_123);

        let value = serde_json::to_value(&outcome)?;
        assert_eq!(value["timestamp"], "2026-03-14T02:30:05Z");
        assert_eq!(value["result"]["equal"], 4);
        assert_eq!(value["result"]["added_files"][0], "a.txt");
        assert!(value["result"].get("removed_files").is_none());
        assert_eq!(value["timings"]["diff"], 2_000_000_000_u64);
        assert_eq!(value["timings"]["total"], 2_000_000_123_u64);
        assert_eq!(value["timings"]["touch"], 0);
        assert!(value.get("error").is_none());
        Ok(())
    }

    #[test]
    fn error_is_serialised_as_text() -> TestResult<()> {
        let mut outcome = fixed_outcome()?;
        outcome.error = Some(PipelineError::from(ThresholdViolation {
            category: ChangeKind::Updated,
            actual: 500,
            limit: 400,
        }));
        assert!(!outcome.is_success());
        let value = serde_json::to_value(&outcome)?;
        assert_eq!(value["error"], "updated files exceed threshold (500 > 400)");
        Ok(())
    }

    #[test]
    fn write_json_creates_directory_and_names_file_by_timestamp() -> TestResult<()> {
        let temp = tempfile::tempdir()?;
        let dir = temp.path().join("nested").join("runs");
        let outcome = fixed_outcome()?;

        let path = outcome.write_json(&dir)?;
        assert_eq!(path, dir.join("2026-03-14T02:30:05Z.json"));

        let written: serde_json::Value = serde_json::from_slice(&fs::read(&path)?)?;
        assert_eq!(written["timestamp"], "2026-03-14T02:30:05Z");
        assert_eq!(written["result"]["equal"], 0);
        Ok(())
    }

    #[test]
    fn write_json_reports_unwritable_directory() -> TestResult<()> {
        let temp = tempfile::tempdir()?;
        let blocker = temp.path().join("file");
        fs::write(&blocker, b"not a directory")?;

        let err = fixed_outcome()?
            .write_json(&blocker.join("runs"))
            .expect_err("directory creation should fail");
        assert!(matches!(
            err,
            PipelineError::Io {
                operation: "create_output_dir",
                ..
            }
        ));
        Ok(())
    }
}
