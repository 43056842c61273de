#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! File-backed configuration for the raidgate runner.
//!
//! Layout: `model.rs` (file and resolved config models), `defaults.rs` (fallback
//! values), `loader.rs` (YAML loading), `validate.rs` (path and range checks),
//! `overrides.rs` (CLI flag merging).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod overrides;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use model::{
    FileConfig, FileScrub, FileSteps, FileThresholds, Notifications, RunnerConfig, ScrubSettings,
};
pub use overrides::ConfigOverrides;
