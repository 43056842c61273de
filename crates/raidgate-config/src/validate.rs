//! Validation for resolved configuration.
//!
//! # Design
//! - Required paths must be non-empty and exist at validation time.
//! - Scrub parameters are range-checked while converting to pipeline types, so the
//!   same check covers file values and CLI overrides.

use std::fs;
use std::path::Path;

use raidgate_pipeline::ScrubOptions;

use crate::error::{ConfigError, ConfigResult};
use crate::model::RunnerConfig;

const MAX_SCRUB_PLAN: i64 = 100;

impl RunnerConfig {
    /// Check required paths and scrub ranges.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> ConfigResult<()> {
        require_existing("snapraid_bin", &self.snapraid_bin)?;
        require_existing("snapraid_config", &self.snapraid_config)?;
        self.scrub_options().map(drop)
    }

    /// Scrub parameters as passed to the executor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when `plan` is outside 0..=100 or
    /// `older_than` is negative.
    pub fn scrub_options(&self) -> ConfigResult<ScrubOptions> {
        let plan = self.scrub.plan;
        if !(0..=MAX_SCRUB_PLAN).contains(&plan) {
            return Err(invalid("scrub.plan", plan, "must be between 0 and 100"));
        }
        let older_than = self.scrub.older_than;
        if older_than < 0 {
            return Err(invalid("scrub.older_than", older_than, "must be >= 0"));
        }
        Ok(ScrubOptions {
            plan: u8::try_from(plan)
                .map_err(|_| invalid("scrub.plan", plan, "must be between 0 and 100"))?,
            older_than: u32::try_from(older_than)
                .map_err(|_| invalid("scrub.older_than", older_than, "must fit in 32 bits"))?,
        })
    }
}

fn require_existing(field: &'static str, path: &Path) -> ConfigResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::MissingField { field });
    }
    fs::metadata(path)
        .map(drop)
        .map_err(|source| ConfigError::PathNotFound {
            field,
            path: path.to_path_buf(),
            source,
        })
}

fn invalid(field: &'static str, value: i64, message: &'static str) -> ConfigError {
    ConfigError::InvalidField {
        field,
        value: value.to_string(),
        message,
    }
}
