//! Command-line surface and process entry point.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use raidgate_config::ConfigOverrides;
use raidgate_config::defaults::CONFIG_PATH;
use raidgate_pipeline::ChangeKind;
use raidgate_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};

use crate::app::drive;

const BUILD_SHA: &str = match option_env!("RAIDGATE_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};
const VERBOSE_LOG_LEVEL: &str = "debug";

/// Flags accepted by the `raidgate` binary.
#[derive(Debug, Parser)]
#[command(
    name = "raidgate",
    version,
    about = "Supervised touch/diff/sync/scrub/smart runs for SnapRAID arrays"
)]
pub struct Cli {
    /// Path to the raidgate YAML configuration file.
    #[arg(short = 'c', long = "config", env = "RAIDGATE_CONFIG", default_value = CONFIG_PATH)]
    pub config: PathBuf,

    /// Detect changes only; never touch, sync, scrub, or smart.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip notifications for this run.
    #[arg(long)]
    pub no_notify: bool,

    /// Directory receiving the JSON run result.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format: text, pretty, or json.
    #[arg(long, value_name = "FORMAT", env = "RAIDGATE_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Run `snapraid touch` before diffing.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_touch")]
    pub touch: bool,
    /// Skip `snapraid touch`.
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_touch: bool,

    /// Run `snapraid scrub` after sync.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_scrub")]
    pub scrub: bool,
    /// Skip `snapraid scrub`.
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_scrub: bool,

    /// Run `snapraid smart` last.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_smart")]
    pub smart: bool,
    /// Skip `snapraid smart`.
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_smart: bool,

    /// Disable the added-files threshold.
    #[arg(long)]
    pub no_threshold_add: bool,
    /// Disable the removed-files threshold.
    #[arg(long)]
    pub no_threshold_remove: bool,
    /// Disable the updated-files threshold.
    #[arg(long)]
    pub no_threshold_update: bool,
    /// Disable the moved-files threshold.
    #[arg(long)]
    pub no_threshold_move: bool,
    /// Disable the copied-files threshold.
    #[arg(long)]
    pub no_threshold_copy: bool,
    /// Disable the restored-files threshold.
    #[arg(long)]
    pub no_threshold_restore: bool,

    /// Scrub plan percentage (0-100).
    #[arg(long, value_name = "PERCENT")]
    pub plan: Option<i64>,

    /// Minimum block age in days for scrub.
    #[arg(long, value_name = "DAYS")]
    pub older_than: Option<i64>,
}

impl Cli {
    /// Flag values to merge over the configuration file.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        let disabled_thresholds = [
            (self.no_threshold_add, ChangeKind::Added),
            (self.no_threshold_remove, ChangeKind::Removed),
            (self.no_threshold_update, ChangeKind::Updated),
            (self.no_threshold_move, ChangeKind::Moved),
            (self.no_threshold_copy, ChangeKind::Copied),
            (self.no_threshold_restore, ChangeKind::Restored),
        ]
        .into_iter()
        .filter_map(|(disabled, kind)| disabled.then_some(kind))
        .collect();

        ConfigOverrides {
            output_dir: self.output_dir.clone(),
            no_notify: self.no_notify,
            touch: toggle(self.touch, self.no_touch),
            scrub: toggle(self.scrub, self.no_scrub),
            smart: toggle(self.smart, self.no_smart),
            disabled_thresholds,
            plan: self.plan,
            older_than: self.older_than,
            dry_run: self.dry_run,
        }
    }

    fn logging_config(&self) -> LoggingConfig<'static> {
        LoggingConfig {
            level: if self.verbose {
                VERBOSE_LOG_LEVEL
            } else {
                DEFAULT_LOG_LEVEL
            },
            format: self.log_format.unwrap_or_else(LogFormat::infer),
            build_sha: BUILD_SHA,
        }
    }
}

const fn toggle(enable: bool, disable: bool) -> Option<bool> {
    match (enable, disable) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Parse flags, install logging, run once, and return the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli.logging_config()) {
        eprintln!("error: {err}");
        return 3;
    }

    match drive(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}
