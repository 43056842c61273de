//! Command-line overrides layered on top of the validated file configuration.

use std::path::PathBuf;

use raidgate_pipeline::{ChangeKind, ThresholdSet};
use tracing::debug;

use crate::error::ConfigResult;
use crate::model::RunnerConfig;

/// Flag values that take precedence over the configuration file.
///
/// `None` and empty fields leave the file value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replace `output_dir`.
    pub output_dir: Option<PathBuf>,
    /// Suppress notifications and clear their credentials.
    pub no_notify: bool,
    /// Force the touch step on or off.
    pub touch: Option<bool>,
    /// Force the scrub step on or off.
    pub scrub: Option<bool>,
    /// Force the smart step on or off.
    pub smart: Option<bool>,
    /// Categories whose limit is disabled for this run.
    pub disabled_thresholds: Vec<ChangeKind>,
    /// Replace the scrub plan percentage.
    pub plan: Option<i64>,
    /// Replace the scrub minimum age.
    pub older_than: Option<i64>,
    /// Detect changes only.
    pub dry_run: bool,
}

impl RunnerConfig {
    /// Merge `overrides` into this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when an overridden scrub parameter is out of range.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> ConfigResult<()> {
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = (!dir.as_os_str().is_empty()).then(|| dir.clone());
        }

        if overrides.no_notify {
            self.notify_suppressed = true;
            self.notifications.slack_token.clear();
            self.notifications.slack_channel.clear();
        }

        if let Some(touch) = overrides.touch {
            self.steps.touch = touch;
        }
        if let Some(scrub) = overrides.scrub {
            self.steps.scrub = scrub;
        }
        if let Some(smart) = overrides.smart {
            self.steps.smart = smart;
        }

        for kind in &overrides.disabled_thresholds {
            disable(&mut self.thresholds, *kind);
        }

        if let Some(plan) = overrides.plan {
            self.scrub.plan = plan;
        }
        if let Some(older_than) = overrides.older_than {
            self.scrub.older_than = older_than;
        }
        self.scrub_options()?;

        self.dry_run |= overrides.dry_run;
        debug!(
            dry_run = self.dry_run,
            notify_suppressed = self.notify_suppressed,
            "applied command-line overrides"
        );
        Ok(())
    }
}

const fn disable(limits: &mut ThresholdSet, kind: ChangeKind) {
    let slot = match kind {
        ChangeKind::Added => &mut limits.add,
        ChangeKind::Removed => &mut limits.remove,
        ChangeKind::Updated => &mut limits.update,
        ChangeKind::Moved => &mut limits.move_,
        ChangeKind::Copied => &mut limits.copy,
        ChangeKind::Restored => &mut limits.restore,
    };
    *slot = ThresholdSet::DISABLED;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::model::{FileConfig, Notifications};

    fn base() -> RunnerConfig {
        FileConfig {
            output_dir: "/var/lib/raidgate".into(),
            notifications: Notifications {
                slack_token: "xoxb-1".into(),
                slack_channel: "ops".into(),
                web: "https://nas.local".into(),
            },
            ..FileConfig::default()
        }
        .resolve()
    }

    #[test]
    fn empty_overrides_change_nothing() -> ConfigResult<()> {
        let mut config = base();
        config.apply_overrides(&ConfigOverrides::default())?;
        assert_eq!(config, base());
        Ok(())
    }

    #[test]
    fn no_notify_clears_credentials() -> ConfigResult<()> {
        let mut config = base();
        config.apply_overrides(&ConfigOverrides {
            no_notify: true,
            ..ConfigOverrides::default()
        })?;
        assert!(!config.wants_slack());
        assert!(config.notifications.slack_token.is_empty());
        assert!(config.notifications.slack_channel.is_empty());
        assert_eq!(config.notifications.web, "https://nas.local");
        Ok(())
    }

    #[test]
    fn step_toggles_set_both_directions() -> ConfigResult<()> {
        let mut config = base();
        config.steps.smart = true;
        config.apply_overrides(&ConfigOverrides {
            touch: Some(true),
            smart: Some(false),
            ..ConfigOverrides::default()
        })?;
        assert!(config.steps.touch);
        assert!(!config.steps.scrub);
        assert!(!config.steps.smart);
        Ok(())
    }

    #[test]
    fn disabled_thresholds_become_unlimited() -> ConfigResult<()> {
        let mut config = base();
        config.apply_overrides(&ConfigOverrides {
            disabled_thresholds: vec![ChangeKind::Removed, ChangeKind::Updated],
            ..ConfigOverrides::default()
        })?;
        assert_eq!(config.thresholds, ThresholdSet::unlimited());
        Ok(())
    }

    #[test]
    fn output_dir_and_dry_run_propagate() -> ConfigResult<()> {
        let mut config = base();
        config.apply_overrides(&ConfigOverrides {
            output_dir: Some("/tmp/runs".into()),
            dry_run: true,
            ..ConfigOverrides::default()
        })?;
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/runs")));
        assert!(config.pipeline_config()?.dry_run);
        Ok(())
    }

    #[test]
    fn scrub_overrides_are_revalidated() {
        let mut config = base();
        let err = config
            .apply_overrides(&ConfigOverrides {
                plan: Some(150),
                ..ConfigOverrides::default()
            })
            .expect_err("plan out of range");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "scrub.plan",
                ..
            }
        ));
    }

    #[test]
    fn scrub_overrides_replace_file_values() -> ConfigResult<()> {
        let mut config = base();
        config.apply_overrides(&ConfigOverrides {
            plan: Some(5),
            older_than: Some(0),
            ..ConfigOverrides::default()
        })?;
        let scrub = config.pipeline_config()?.scrub;
        assert_eq!((scrub.plan, scrub.older_than), (5, 0));
        Ok(())
    }
}
