//! Domain types shared by the parser, the threshold gate, and the runner.
//!
//! # Design
//! - `ChangeSet` keeps paths exactly as the tool printed them; counts are derived
//!   from the itemised lists rather than the tool's own summary totals.
//! - `ChangeKind` fixes the category order used by every consumer (gate, logs, summaries).
//! - Limits use `-1` as the "unlimited" sentinel so configuration files stay readable.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Change categories reported by `snapraid diff`, in gate evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Files present on disk but not in the parity state.
    Added,
    /// Files in the parity state that vanished from disk.
    Removed,
    /// Files whose content or metadata changed.
    Updated,
    /// Files relocated within the same disk.
    Moved,
    /// Files duplicated from another location.
    Copied,
    /// Files restored to a previously known state.
    Restored,
}

impl ChangeKind {
    /// Every category in the fixed evaluation order.
    pub const ALL: [Self; 6] = [
        Self::Added,
        Self::Removed,
        Self::Updated,
        Self::Moved,
        Self::Copied,
        Self::Restored,
    ];

    /// Past-tense label used in logs, violations, and summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Updated => "updated",
            Self::Moved => "moved",
            Self::Copied => "copied",
            Self::Restored => "restored",
        }
    }

    /// Action token the tool prints in front of an itemised path.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Added => "add",
            Self::Removed => "remove",
            Self::Updated => "update",
            Self::Moved => "move",
            Self::Copied => "copy",
            Self::Restored => "restore",
        }
    }

    /// Map an already lower-cased action token to its category.
    #[must_use]
    pub fn from_action(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.action() == token)
    }
}

impl Display for ChangeKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Parsed result of a single `snapraid diff` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Number of files reported as unchanged.
    pub equal: u64,
    /// Paths of newly added files.
    #[serde(rename = "added_files", default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    /// Paths of removed files.
    #[serde(rename = "removed_files", default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
    /// Paths of updated files.
    #[serde(rename = "updated_files", default, skip_serializing_if = "Vec::is_empty")]
    pub updated: Vec<String>,
    /// Paths of moved files.
    #[serde(rename = "moved_files", default, skip_serializing_if = "Vec::is_empty")]
    pub moved: Vec<String>,
    /// Paths of copied files.
    #[serde(rename = "copied_files", default, skip_serializing_if = "Vec::is_empty")]
    pub copied: Vec<String>,
    /// Paths of restored files.
    #[serde(rename = "restored_files", default, skip_serializing_if = "Vec::is_empty")]
    pub restored: Vec<String>,
}

impl ChangeSet {
    /// Paths recorded for `kind`, in the order the tool emitted them.
    #[must_use]
    pub fn paths(&self, kind: ChangeKind) -> &[String] {
        match kind {
            ChangeKind::Added => &self.added,
            ChangeKind::Removed => &self.removed,
            ChangeKind::Updated => &self.updated,
            ChangeKind::Moved => &self.moved,
            ChangeKind::Copied => &self.copied,
            ChangeKind::Restored => &self.restored,
        }
    }

    pub(crate) fn paths_mut(&mut self, kind: ChangeKind) -> &mut Vec<String> {
        match kind {
            ChangeKind::Added => &mut self.added,
            ChangeKind::Removed => &mut self.removed,
            ChangeKind::Updated => &mut self.updated,
            ChangeKind::Moved => &mut self.moved,
            ChangeKind::Copied => &mut self.copied,
            ChangeKind::Restored => &mut self.restored,
        }
    }

    /// Number of paths recorded for `kind`.
    #[must_use]
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.paths(kind).len()
    }

    /// Returns `true` when any category holds at least one path.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        ChangeKind::ALL.into_iter().any(|kind| self.count(kind) > 0)
    }
}

/// Per-category limits applied before sync; negative values disable a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// Maximum added files.
    pub add: i64,
    /// Maximum removed files.
    pub remove: i64,
    /// Maximum updated files.
    pub update: i64,
    /// Maximum moved files.
    #[serde(rename = "move")]
    pub move_: i64,
    /// Maximum copied files.
    pub copy: i64,
    /// Maximum restored files.
    pub restore: i64,
}

impl ThresholdSet {
    /// Sentinel that disables a single limit.
    pub const DISABLED: i64 = -1;

    /// A set with every limit disabled.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            add: Self::DISABLED,
            remove: Self::DISABLED,
            update: Self::DISABLED,
            move_: Self::DISABLED,
            copy: Self::DISABLED,
            restore: Self::DISABLED,
        }
    }

    /// Raw configured value for `kind`.
    #[must_use]
    pub const fn raw(&self, kind: ChangeKind) -> i64 {
        match kind {
            ChangeKind::Added => self.add,
            ChangeKind::Removed => self.remove,
            ChangeKind::Updated => self.update,
            ChangeKind::Moved => self.move_,
            ChangeKind::Copied => self.copy,
            ChangeKind::Restored => self.restore,
        }
    }

    /// Enabled cap for `kind`, or `None` when the limit is disabled.
    #[must_use]
    pub fn limit(&self, kind: ChangeKind) -> Option<u64> {
        u64::try_from(self.raw(kind)).ok()
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self::unlimited()
    }
}

/// SnapRAID subcommands supervised by the pipeline, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// `snapraid touch`
    Touch,
    /// `snapraid diff`
    Diff,
    /// `snapraid sync`
    Sync,
    /// `snapraid scrub`
    Scrub,
    /// `snapraid smart`
    Smart,
}

impl Step {
    /// Subcommand name, also used as the log tag for the step's output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Touch => "touch",
            Self::Diff => "diff",
            Self::Sync => "sync",
            Self::Scrub => "scrub",
            Self::Smart => "smart",
        }
    }
}

impl Display for Step {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Optional steps toggled by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Steps {
    /// Run `snapraid touch` before diffing.
    pub touch: bool,
    /// Run `snapraid scrub` after sync.
    pub scrub: bool,
    /// Run `snapraid smart` last.
    pub smart: bool,
}

/// Parameters forwarded to `snapraid scrub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrubOptions {
    /// Percentage of the array to scrub (0-100).
    pub plan: u8,
    /// Minimum age in days of blocks to scrub.
    pub older_than: u32,
}

/// Read-only inputs steering a single pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Which optional steps run.
    pub steps: Steps,
    /// Detect changes only; never touch, sync, scrub, or smart.
    pub dry_run: bool,
    /// Scrub parameters.
    pub scrub: ScrubOptions,
}
