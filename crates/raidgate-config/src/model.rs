//! Configuration models: the file shape as written by operators and the resolved
//! form consumed by the runner.

use std::path::PathBuf;

use raidgate_pipeline::{PipelineConfig, Steps, ThresholdSet};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ConfigResult;

/// Root of the YAML configuration file.
///
/// Every key is optional at parse time; [`FileConfig::resolve`] fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Path to the snapraid executable.
    pub snapraid_bin: String,
    /// Path to the snapraid configuration file passed via `--conf`.
    pub snapraid_config: String,
    /// Directory receiving one JSON file per run; empty disables persistence.
    pub output_dir: String,
    /// Per-category change limits.
    pub thresholds: FileThresholds,
    /// Optional step toggles.
    pub steps: FileSteps,
    /// Scrub parameters.
    pub scrub: FileScrub,
    /// Slack delivery settings.
    pub notifications: Notifications,
}

/// Threshold block; `None` means "use the default", `-1` disables the limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileThresholds {
    /// Added files.
    pub add: Option<i64>,
    /// Removed files.
    pub remove: Option<i64>,
    /// Updated files.
    pub update: Option<i64>,
    /// Copied files.
    pub copy: Option<i64>,
    /// Moved files.
    #[serde(rename = "move")]
    pub move_: Option<i64>,
    /// Restored files.
    pub restore: Option<i64>,
}

/// Step toggles as written in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSteps {
    /// Run `snapraid touch` before diffing.
    pub touch: Option<bool>,
    /// Run `snapraid scrub` after sync.
    pub scrub: Option<bool>,
    /// Run `snapraid smart` last.
    pub smart: Option<bool>,
}

/// Scrub block as written in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileScrub {
    /// Percentage of the array to scrub.
    pub plan: Option<i64>,
    /// Minimum block age in days.
    pub older_than: Option<i64>,
}

/// Slack notification settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notifications {
    /// Bot user OAuth token.
    pub slack_token: String,
    /// Channel name or ID.
    pub slack_channel: String,
    /// Base URL of the web UI linked from summaries.
    pub web: String,
}

/// Scrub parameters after defaulting, before range validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrubSettings {
    /// Percentage of the array to scrub; valid range is 0..=100.
    pub plan: i64,
    /// Minimum block age in days; must not be negative.
    pub older_than: i64,
}

/// Fully defaulted configuration driving one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Path to the snapraid executable.
    pub snapraid_bin: PathBuf,
    /// Path to the snapraid configuration file.
    pub snapraid_config: PathBuf,
    /// Outcome directory; `None` disables persistence.
    pub output_dir: Option<PathBuf>,
    /// Resolved change limits.
    pub thresholds: ThresholdSet,
    /// Resolved step toggles.
    pub steps: Steps,
    /// Scrub parameters.
    pub scrub: ScrubSettings,
    /// Slack delivery settings.
    pub notifications: Notifications,
    /// Detect changes only.
    pub dry_run: bool,
    /// Set by `--no-notify`.
    pub notify_suppressed: bool,
}

impl FileConfig {
    /// Apply defaults to every omitted key.
    #[must_use]
    pub fn resolve(self) -> RunnerConfig {
        let thresholds = ThresholdSet {
            add: self.thresholds.add.unwrap_or(defaults::ADD_THRESHOLD),
            remove: self.thresholds.remove.unwrap_or(defaults::REMOVE_THRESHOLD),
            update: self.thresholds.update.unwrap_or(defaults::UPDATE_THRESHOLD),
            move_: self.thresholds.move_.unwrap_or(defaults::MOVE_THRESHOLD),
            copy: self.thresholds.copy.unwrap_or(defaults::COPY_THRESHOLD),
            restore: self.thresholds.restore.unwrap_or(defaults::RESTORE_THRESHOLD),
        };
        let steps = Steps {
            touch: self.steps.touch.unwrap_or(false),
            scrub: self.steps.scrub.unwrap_or(false),
            smart: self.steps.smart.unwrap_or(false),
        };
        let scrub = ScrubSettings {
            plan: self.scrub.plan.unwrap_or(defaults::SCRUB_PLAN),
            older_than: self.scrub.older_than.unwrap_or(defaults::SCRUB_OLDER_THAN),
        };
        let output_dir = (!self.output_dir.trim().is_empty()).then(|| PathBuf::from(self.output_dir));

        RunnerConfig {
            snapraid_bin: PathBuf::from(self.snapraid_bin),
            snapraid_config: PathBuf::from(self.snapraid_config),
            output_dir,
            thresholds,
            steps,
            scrub,
            notifications: self.notifications,
            dry_run: false,
            notify_suppressed: false,
        }
    }
}

impl RunnerConfig {
    /// Returns `true` when Slack delivery is configured and not suppressed.
    #[must_use]
    pub fn wants_slack(&self) -> bool {
        !self.notify_suppressed
            && !self.notifications.slack_token.is_empty()
            && !self.notifications.slack_channel.is_empty()
    }

    /// Web UI base URL, when configured.
    #[must_use]
    pub fn web_url(&self) -> Option<&str> {
        let web = self.notifications.web.trim();
        (!web.is_empty()).then_some(web)
    }

    /// Pipeline inputs derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the scrub parameters are out of range.
    pub fn pipeline_config(&self) -> ConfigResult<PipelineConfig> {
        Ok(PipelineConfig {
            steps: self.steps,
            dry_run: self.dry_run,
            scrub: self.scrub_options()?,
        })
    }
}
