//! Fallback values applied to keys omitted from the configuration file.
//!
//! # Design
//! - Only absent keys fall back; an explicit `0` or `-1` is always honoured.
//! - Optional steps default to disabled.

/// Default configuration file location.
pub const CONFIG_PATH: &str = "/etc/raidgate.yml";

pub(crate) const ADD_THRESHOLD: i64 = -1;
pub(crate) const REMOVE_THRESHOLD: i64 = 80;
pub(crate) const UPDATE_THRESHOLD: i64 = 400;
pub(crate) const COPY_THRESHOLD: i64 = -1;
pub(crate) const MOVE_THRESHOLD: i64 = -1;
pub(crate) const RESTORE_THRESHOLD: i64 = -1;

pub(crate) const SCRUB_PLAN: i64 = 22;
pub(crate) const SCRUB_OLDER_THAN: i64 = 12;
